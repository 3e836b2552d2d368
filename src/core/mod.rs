//! Core domain layer containing value objects, errors, and domain rules
//!
//! # Design Principles
//!
//! 1. **Independence**: Core domain does not depend on the configuration or CLI layers
//! 2. **Immutability**: Value objects are immutable
//! 3. **Exact money**: USD amounts are `Decimal`, never floating point

pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorContext, ErrorKind, ErrorSeverity};
pub use result::AppResult;
pub use types::*;

/// Domain constants and business rules
pub mod domain {
    /// Fee domain rules
    pub mod fees {
        use rust_decimal::Decimal;

        /// Basis points in one whole (100%)
        pub const BPS_DENOMINATOR: u32 = 10_000;

        /// Highest fee a tier may charge
        pub const MAX_FEE_BPS: u32 = BPS_DENOMINATOR;

        /// Default Ape Mode surcharge multiplier
        pub const DEFAULT_APE_MODE_MULTIPLIER: Decimal = rust_decimal_macros::dec!(1.5);

        /// Fee charged on promotional swaps
        pub const DEFAULT_PROMOTIONAL_FEE_BPS: u32 = 0;
    }

    /// Milestone domain rules
    pub mod milestones {
        use rust_decimal::Decimal;

        /// Worst rank that can still earn a milestone reward
        pub const DEFAULT_TOP_RANK: u32 = 10;

        /// Minimum completed trades before a reward is paid
        pub const DEFAULT_MIN_TRADE_COUNT: u32 = 5;

        /// Minimum platform fees paid (USD) before a reward is paid
        pub const DEFAULT_MIN_FEES_PAID_USD: Decimal = rust_decimal_macros::dec!(25);
    }

    /// Reward and referral rates
    pub mod rewards {
        use rust_decimal::Decimal;

        /// XP credited to a trader per USD of volume
        pub const DEFAULT_TRADER_XP_PER_USD: Decimal = rust_decimal_macros::dec!(10);

        /// Share of the trader's fee credited to the referrer
        pub const DEFAULT_REFERRAL_FEE_SHARE: Decimal = rust_decimal_macros::dec!(0.10);

        /// Referrer XP per USD of the referred trader's volume
        pub const DEFAULT_REFERRAL_XP_PER_USD: Decimal = rust_decimal_macros::dec!(0.20);

        /// Prefix of generated referral codes
        pub const DEFAULT_REFERRAL_CODE_PREFIX: &str = "SHX-";

        /// Leaderboard length shown to users
        pub const DEFAULT_LEADERBOARD_SIZE: usize = 50;
    }
}

/// Rounding helpers shared by the calculators
pub mod arithmetic {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::{Decimal, RoundingStrategy};

    /// Round to a whole number, halves away from zero
    pub fn round_half_up(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Round half-up into a `u32`, saturating at the type bounds
    pub fn round_to_u32(value: Decimal) -> u32 {
        let rounded = round_half_up(value);
        if rounded.is_sign_negative() {
            return 0;
        }
        rounded.to_u32().unwrap_or(u32::MAX)
    }

    /// Floor into an `i64`, saturating at the type bounds
    pub fn floor_to_i64(value: Decimal) -> i64 {
        let floored = value.floor();
        floored.to_i64().unwrap_or(if floored.is_sign_negative() { i64::MIN } else { i64::MAX })
    }

    /// Convert basis points into a percentage (`18` → `0.18`)
    pub fn bps_to_percent(bps: u32) -> Decimal {
        Decimal::from(bps) / Decimal::ONE_HUNDRED
    }
}

/// Domain validation rules and helpers
pub mod validation {
    use anyhow::{anyhow, Result};

    /// Validate a Solana address format
    pub fn validate_solana_address(address: &str) -> Result<()> {
        if address.len() < 32 || address.len() > 44 {
            return Err(anyhow!("Invalid Solana address length: {}", address.len()));
        }

        // Basic base58 validation
        if !address.chars().all(|c| {
            matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
        }) {
            return Err(anyhow!("Invalid base58 characters in address"));
        }

        Ok(())
    }

}
