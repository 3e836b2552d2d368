//! XP and referral rates, and the per-trade settlement built from them

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::models::RewardsConfig;
use crate::core::arithmetic::floor_to_i64;
use crate::core::domain::fees::BPS_DENOMINATOR;
use crate::core::domain::rewards::{
    DEFAULT_REFERRAL_FEE_SHARE, DEFAULT_REFERRAL_XP_PER_USD, DEFAULT_TRADER_XP_PER_USD,
};
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::ensure;
use super::referrals::ReferralSplit;

/// Rates used to turn a completed trade into XP and referral credit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    /// XP per USD of the trader's own volume
    pub trader_xp_per_usd: Decimal,
    /// Share of the trader's fee credited to the referrer
    pub referral_fee_share: Decimal,
    /// Referrer XP per USD of the referred trader's volume
    pub referral_xp_per_usd: Decimal,
}

impl RewardPolicy {
    /// Build a policy from the `[rewards]` configuration section
    pub fn from_config(config: &RewardsConfig) -> AppResult<Self> {
        let policy = Self {
            trader_xp_per_usd: config.trader_xp_per_usd,
            referral_fee_share: config.referral_fee_share,
            referral_xp_per_usd: config.referral_xp_per_usd,
        };
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> AppResult<()> {
        ensure!(
            !self.trader_xp_per_usd.is_sign_negative(),
            AppError::invalid_field("rewards.trader_xp_per_usd", self.trader_xp_per_usd, "cannot be negative")
        );
        ensure!(
            !self.referral_xp_per_usd.is_sign_negative(),
            AppError::invalid_field("rewards.referral_xp_per_usd", self.referral_xp_per_usd, "cannot be negative")
        );
        ensure!(
            (Decimal::ZERO..=Decimal::ONE).contains(&self.referral_fee_share),
            AppError::invalid_field("rewards.referral_fee_share", self.referral_fee_share, "must be between 0 and 1")
        );
        Ok(())
    }

    /// Referrer credit for one trade of a referred wallet
    ///
    /// Inputs are expected to be non-negative; they are not clamped. Products
    /// beyond the `Decimal` range saturate.
    pub fn referral_split(&self, fee_usd: Decimal, volume_usd: Decimal) -> ReferralSplit {
        ReferralSplit {
            referral_earning_usd: fee_usd.saturating_mul(self.referral_fee_share),
            bonus_xp: floor_to_i64(volume_usd.saturating_mul(self.referral_xp_per_usd)),
        }
    }

    /// Fee, XP and referral credit for a completed swap
    pub fn settle(&self, volume_usd: Decimal, fee_bps: u32, referred: bool) -> TradeSettlement {
        let fee_rate = Decimal::from(fee_bps) / Decimal::from(BPS_DENOMINATOR);
        let fee_usd = volume_usd.saturating_mul(fee_rate);

        TradeSettlement {
            volume_usd,
            fee_bps,
            fee_usd,
            trader_xp: floor_to_i64(volume_usd.saturating_mul(self.trader_xp_per_usd)),
            referral: referred.then(|| self.referral_split(fee_usd, volume_usd)),
        }
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            trader_xp_per_usd: DEFAULT_TRADER_XP_PER_USD,
            referral_fee_share: DEFAULT_REFERRAL_FEE_SHARE,
            referral_xp_per_usd: DEFAULT_REFERRAL_XP_PER_USD,
        }
    }
}

/// Everything the persistence layer credits after one swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSettlement {
    /// Swap volume (USD)
    pub volume_usd: Decimal,
    /// Fee charged
    pub fee_bps: u32,
    /// Fee paid (USD)
    pub fee_usd: Decimal,
    /// XP credited to the trader
    pub trader_xp: i64,
    /// Credit for the referrer, when the trader was referred
    pub referral: Option<ReferralSplit>,
}
