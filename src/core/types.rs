//! Core type definitions and value objects for the domain model
//!
//! Strongly-typed wrappers and the plain input records the engine is fed by
//! its collaborators (holdings lookup, leaderboard read model).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use rust_decimal::Decimal;

/// Solana wallet address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a new wallet address with validation
    pub fn new(address: String) -> Result<Self, crate::core::error::AppError> {
        crate::core::validation::validate_solana_address(&address)
            .map_err(|e| crate::core::error::AppError::invalid_field("wallet", &address, &e.to_string()))?;
        Ok(Self(address))
    }

    /// Get the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the inner string value
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = crate::core::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim().to_string())
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = crate::core::error::AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

/// USD value of the reference token held by a wallet at lookup time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    /// Wallet the holdings belong to
    pub wallet: WalletAddress,
    /// Holdings in USD; negative values are treated as zero by the engine
    pub holdings_usd: Decimal,
}

/// Leaderboard statistics for one trader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TradeStats {
    /// 1-based leaderboard rank; anything below 1 means unranked
    pub rank: i64,
    /// Traded volume in USD
    pub volume_usd: Decimal,
    /// Number of completed trades
    pub trade_count: u32,
    /// Platform fees paid in USD
    pub total_fees_paid_usd: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[test]
    fn test_wallet_address_validation() {
        assert!(WalletAddress::from_str(WALLET).is_ok());
        assert!(WalletAddress::from_str("not-a-wallet").is_err());
        // 0, O, I and l are not base58
        assert!(WalletAddress::from_str("0xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU").is_err());
    }

    #[test]
    fn test_wallet_address_serde() {
        let wallet = WalletAddress::from_str(WALLET).unwrap();
        let json = serde_json::to_string(&wallet).unwrap();
        assert_eq!(json, format!("\"{WALLET}\""));

        let parsed: WalletAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, wallet);
        assert!(serde_json::from_str::<WalletAddress>("\"short\"").is_err());
    }

    #[test]
    fn test_trade_stats_default() {
        let stats = TradeStats::default();
        assert_eq!(stats.rank, 0);
        assert_eq!(stats.volume_usd, dec!(0));
    }
}
