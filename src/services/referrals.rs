//! Referral codes and referrer credit
//!
//! Whether a trader was referred is tracked by the persistence layer. This
//! module only derives codes, screens new relationships, and describes the
//! credit owed for a trade (see [`RewardPolicy::referral_split`]).
//!
//! [`RewardPolicy::referral_split`]: super::rewards::RewardPolicy::referral_split

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::WalletAddress;

/// Referrer credit for one trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralSplit {
    /// USD credited to the referrer
    pub referral_earning_usd: Decimal,
    /// XP credited to the referrer
    pub bonus_xp: i64,
}

/// Reasons a referral relationship is refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferralRejection {
    /// The wallet entered its own code
    #[error("Cannot refer yourself")]
    SelfReferral,
}

/// Derive a wallet's referral code: prefix, then the first and last four characters, upper-cased
pub fn generate_referral_code(prefix: &str, wallet: &WalletAddress) -> String {
    let address = wallet.as_str();
    // base58 is ASCII and addresses are at least 32 characters long
    let head = &address[..4];
    let tail = &address[address.len() - 4..];
    format!("{prefix}{head}{tail}").to_uppercase()
}

/// Normalize a user-entered code for lookup
pub fn normalize_referral_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Screen a new referral relationship
pub fn validate_referral(new_user: &WalletAddress, referrer: &WalletAddress) -> Result<(), ReferralRejection> {
    if new_user == referrer {
        return Err(ReferralRejection::SelfReferral);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn wallet(address: &str) -> WalletAddress {
        WalletAddress::from_str(address).unwrap()
    }

    #[test]
    fn test_generate_referral_code() {
        let w = wallet("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU");
        assert_eq!(generate_referral_code("SHX-", &w), "SHX-7XKXGASU");
    }

    #[test]
    fn test_referral_code_is_stable() {
        let w = wallet("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        assert_eq!(generate_referral_code("SHX-", &w), generate_referral_code("SHX-", &w));
        assert_eq!(generate_referral_code("shx-", &w), "SHX-9WZDAWWM");
    }

    #[test]
    fn test_normalize_referral_code() {
        assert_eq!(normalize_referral_code("  shx-7xkxgasu \n"), "SHX-7XKXGASU");
    }

    #[test]
    fn test_self_referral_rejected() {
        let a = wallet("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU");
        let b = wallet("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");

        assert_eq!(validate_referral(&a, &a), Err(ReferralRejection::SelfReferral));
        assert!(validate_referral(&a, &b).is_ok());
        assert_eq!(ReferralRejection::SelfReferral.to_string(), "Cannot refer yourself");
    }
}
