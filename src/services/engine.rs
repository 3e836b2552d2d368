//! The fee and reward engine
//!
//! `FeeEngine` bundles the fee schedule, the milestone schedule and the
//! reward policy behind one value. It owns plain immutable data: every call
//! is a pure function of its arguments and the tables it was built with, and
//! the engine can be shared across threads behind an `Arc` without locking.

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::config::AppConfig;
use crate::core::result::AppResult;
use crate::core::types::{HoldingsSnapshot, TradeStats, WalletAddress};
use super::fees::{FeeDecision, FeeSchedule, TierView};
use super::leaderboard::{Leaderboard, TraderStanding};
use super::milestones::{MilestoneResult, MilestoneSchedule};
use super::referrals::{generate_referral_code, ReferralSplit};
use super::rewards::{RewardPolicy, TradeSettlement};

/// Fee tiers, milestone rewards and referral credit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeEngine {
    fees: FeeSchedule,
    milestones: MilestoneSchedule,
    rewards: RewardPolicy,
    referral_code_prefix: String,
    leaderboard_size: usize,
}

impl FeeEngine {
    /// Create an engine from explicit tables
    pub fn new(fees: FeeSchedule, milestones: MilestoneSchedule, rewards: RewardPolicy) -> Self {
        Self {
            fees,
            milestones,
            rewards,
            referral_code_prefix: crate::core::domain::rewards::DEFAULT_REFERRAL_CODE_PREFIX.to_string(),
            leaderboard_size: crate::core::domain::rewards::DEFAULT_LEADERBOARD_SIZE,
        }
    }

    /// Create an engine from loaded configuration
    #[instrument(skip(config))]
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let fees = FeeSchedule::from_config(&config.fees)?;
        let milestones = MilestoneSchedule::from_config(&config.milestones)?;
        let rewards = RewardPolicy::from_config(&config.rewards)?;

        debug!(
            tiers = fees.tiers().len(),
            milestones = milestones.milestones().len(),
            ape_mode_multiplier = %fees.ape_mode_multiplier(),
            "fee engine built"
        );

        Ok(Self {
            fees,
            milestones,
            rewards,
            referral_code_prefix: config.referrals.code_prefix.clone(),
            leaderboard_size: config.referrals.leaderboard_size,
        })
    }

    /// Fee schedule in use
    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Milestone schedule in use
    pub fn milestone_schedule(&self) -> &MilestoneSchedule {
        &self.milestones
    }

    /// Reward policy in use
    pub fn reward_policy(&self) -> &RewardPolicy {
        &self.rewards
    }

    /// Basis-point fee for a swap
    pub fn calculate_fee_bps(&self, holdings_usd: Decimal, ape_mode_enabled: bool, is_promotional_swap: bool) -> FeeDecision {
        self.fees.fee_bps(holdings_usd, ape_mode_enabled, is_promotional_swap)
    }

    /// Basis-point fee for a swap by the wallet in `snapshot`
    pub fn fee_for(&self, snapshot: &HoldingsSnapshot, ape_mode_enabled: bool, is_promotional_swap: bool) -> FeeDecision {
        self.calculate_fee_bps(snapshot.holdings_usd, ape_mode_enabled, is_promotional_swap)
    }

    /// Holdings-only tier and progress, ignoring Ape Mode and promotions
    pub fn current_tier(&self, holdings_usd: Decimal) -> TierView {
        self.fees.tier_view(holdings_usd)
    }

    /// Milestone qualification for a ranked trader
    pub fn check_milestone_eligibility(
        &self,
        rank: i64,
        volume_usd: Decimal,
        trade_count: u32,
        total_fees_paid_usd: Decimal,
    ) -> MilestoneResult {
        self.milestones.check(rank, volume_usd, trade_count, total_fees_paid_usd)
    }

    /// Milestone qualification from a [`TradeStats`] record
    pub fn check_milestone(&self, stats: &TradeStats) -> MilestoneResult {
        self.milestones.check_stats(stats)
    }

    /// Referrer credit for a referred trader's fee and volume
    pub fn compute_referral_split(&self, fee_usd: Decimal, volume_usd: Decimal) -> ReferralSplit {
        self.rewards.referral_split(fee_usd, volume_usd)
    }

    /// Fee, XP and referral credit for a completed swap
    pub fn settle_trade(&self, volume_usd: Decimal, fee_bps: u32, referred: bool) -> TradeSettlement {
        self.rewards.settle(volume_usd, fee_bps, referred)
    }

    /// Percentage saved against the base tier
    pub fn discount_pct(&self, fee_bps: u32) -> u32 {
        self.fees.discount_pct(fee_bps)
    }

    /// Referral code for a wallet
    pub fn referral_code(&self, wallet: &WalletAddress) -> String {
        generate_referral_code(&self.referral_code_prefix, wallet)
    }

    /// Rank standings into the public leaderboard
    pub fn leaderboard(&self, standings: Vec<TraderStanding>) -> Leaderboard {
        Leaderboard::rank(standings, self.leaderboard_size)
    }
}

impl Default for FeeEngine {
    fn default() -> Self {
        Self::new(FeeSchedule::default(), MilestoneSchedule::default(), RewardPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fees::FeeTier;
    use crate::services::milestones::{IneligibleReason, VolumeMilestone};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::str::FromStr;
    use std::sync::Arc;

    #[test]
    fn test_end_to_end_holder_fee() {
        let engine = FeeEngine::default();

        let view = engine.current_tier(dec!(20000));
        assert_eq!(view.current, FeeTier::new(dec!(20000), 18, "−64%"));

        assert_eq!(engine.calculate_fee_bps(dec!(20000), false, false).fee_bps, 18);
        assert_eq!(engine.calculate_fee_bps(dec!(20000), true, false).fee_bps, 27);
    }

    #[test]
    fn test_fee_for_snapshot() {
        let engine = FeeEngine::default();
        let snapshot = HoldingsSnapshot {
            wallet: WalletAddress::from_str("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU").unwrap(),
            holdings_usd: dec!(60000),
        };
        assert_eq!(engine.fee_for(&snapshot, false, false).fee_bps, 12);
        assert_eq!(engine.fee_for(&snapshot, true, true).fee_bps, 0);
    }

    #[test]
    fn test_synthetic_tables() {
        let fees = FeeSchedule::new(vec![
            FeeTier::new(dec!(100), 10, "half"),
            FeeTier::new(dec!(0), 20, ""),
        ])
        .unwrap();
        let milestones = MilestoneSchedule::new(vec![VolumeMilestone::new(1, dec!(10), dec!(5), 1)]).unwrap();
        let engine = FeeEngine::new(fees, milestones, RewardPolicy::default());

        assert_eq!(engine.calculate_fee_bps(dec!(99.99), false, false).fee_bps, 20);
        assert_eq!(engine.calculate_fee_bps(dec!(100), true, false).fee_bps, 15);
        assert_eq!(engine.current_tier(dec!(50)).progress_to_next_pct, 50);
        assert_eq!(engine.discount_pct(10), 50);
        assert!(engine.check_milestone_eligibility(1, dec!(10), 5, dec!(25)).is_eligible());
        assert_matches!(
            engine.check_milestone_eligibility(2, dec!(10), 5, dec!(25)),
            MilestoneResult::Ineligible { reason: IneligibleReason::InvalidRank }
        );
    }

    #[test]
    fn test_calls_are_idempotent() {
        let engine = FeeEngine::default();

        for _ in 0..3 {
            assert_eq!(
                engine.calculate_fee_bps(dec!(7500), true, false),
                engine.calculate_fee_bps(dec!(7500), true, false)
            );
            assert_eq!(engine.current_tier(dec!(3333.33)), engine.current_tier(dec!(3333.33)));
            assert_eq!(
                engine.check_milestone_eligibility(4, dec!(1), 5, dec!(25)),
                engine.check_milestone_eligibility(4, dec!(1), 5, dec!(25))
            );
            assert_eq!(
                engine.compute_referral_split(dec!(3.3), dec!(99.9)),
                engine.compute_referral_split(dec!(3.3), dec!(99.9))
            );
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let engine = Arc::new(FeeEngine::default());
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.calculate_fee_bps(Decimal::from(i * 10_000), false, false))
            })
            .collect();

        let fees: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap().fee_bps).collect();
        assert_eq!(fees, vec![50, 25, 18, 18]);
    }

    #[test]
    fn test_settlement_feeds_milestone_stats() {
        let engine = FeeEngine::default();
        let fee = engine.calculate_fee_bps(dec!(0), false, false);
        let settlement = engine.settle_trade(dec!(5000), fee.fee_bps, true);

        assert_eq!(settlement.fee_usd, dec!(25));
        assert_eq!(settlement.trader_xp, 50000);
        assert_eq!(
            settlement.referral,
            Some(ReferralSplit { referral_earning_usd: dec!(2.5), bonus_xp: 1000 })
        );
    }

    #[test]
    fn test_from_config_uses_referral_settings() {
        let mut config = AppConfig::default();
        config.referrals.code_prefix = "TEST-".to_string();
        config.referrals.leaderboard_size = 1;

        let engine = FeeEngine::from_config(&config).unwrap();
        let wallet = WalletAddress::from_str("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU").unwrap();
        assert_eq!(engine.referral_code(&wallet), "TEST-7XKXGASU");

        let board = engine.leaderboard(vec![
            TraderStanding {
                wallet: "a".into(),
                points: 0,
                volume_usd: dec!(1),
                trade_count: 1,
                total_fees_paid_usd: dec!(0),
            },
            TraderStanding {
                wallet: "b".into(),
                points: 0,
                volume_usd: dec!(2),
                trade_count: 1,
                total_fees_paid_usd: dec!(0),
            },
        ]);
        assert_eq!(board.entries().len(), 1);
        assert_eq!(board.rank_of("b"), Some(1));
    }

    #[test]
    fn test_from_config_rejects_bad_tables() {
        let mut config = AppConfig::default();
        config.fees.tiers.reverse();
        assert!(FeeEngine::from_config(&config).is_err());
    }
}
