//! Daily volume milestones for top-ranked traders
//!
//! Each leaderboard rank inside the top bracket has a volume target. A trader
//! who reaches it, and who has traded enough and paid enough in fees, earns a
//! one-time USD reward and a reduced fee for the following day.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::models::MilestonesConfig;
use crate::core::domain::fees::MAX_FEE_BPS;
use crate::core::domain::milestones::{DEFAULT_MIN_FEES_PAID_USD, DEFAULT_MIN_TRADE_COUNT, DEFAULT_TOP_RANK};
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::core::types::TradeStats;
use crate::ensure;

const TABLE: &str = "milestones";

/// Volume target and reward for one rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMilestone {
    /// Leaderboard rank this milestone belongs to
    pub rank: u32,
    /// Volume (USD) the trader must reach
    pub min_volume_usd: Decimal,
    /// One-time reward (USD)
    pub reward_usd: Decimal,
    /// Fee charged the following day
    pub next_day_fee_bps: u32,
}

impl VolumeMilestone {
    /// Create a milestone
    pub fn new(rank: u32, min_volume_usd: Decimal, reward_usd: Decimal, next_day_fee_bps: u32) -> Self {
        Self {
            rank,
            min_volume_usd,
            reward_usd,
            next_day_fee_bps,
        }
    }
}

/// Production milestone table, ranks 1 through 10
pub fn default_milestones() -> Vec<VolumeMilestone> {
    vec![
        VolumeMilestone::new(1, dec!(250000), dec!(1000), 5),
        VolumeMilestone::new(2, dec!(200000), dec!(750), 6),
        VolumeMilestone::new(3, dec!(150000), dec!(600), 6),
        VolumeMilestone::new(4, dec!(125000), dec!(500), 7),
        VolumeMilestone::new(5, dec!(100000), dec!(400), 7),
        VolumeMilestone::new(6, dec!(75000), dec!(300), 8),
        VolumeMilestone::new(7, dec!(60000), dec!(250), 8),
        VolumeMilestone::new(8, dec!(50000), dec!(200), 8),
        VolumeMilestone::new(9, dec!(50000), dec!(200), 8),
        VolumeMilestone::new(10, dec!(50000), dec!(200), 8),
    ]
}

/// Why a trader did not qualify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IneligibleReason {
    /// Rank outside the rewarded bracket
    NotTopTen,
    /// Too few trades
    MinTradesNotMet,
    /// Too little paid in fees
    MinFeesNotMet,
    /// No milestone configured for the rank
    InvalidRank,
    /// Volume below the rank's target
    VolumeNotMet {
        /// Target volume (USD)
        required_usd: Decimal,
        /// Volume reached (USD)
        actual_usd: Decimal,
        /// `required_usd - actual_usd`
        shortfall_usd: Decimal,
    },
}

impl IneligibleReason {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotTopTen => "NOT_TOP_TEN",
            Self::MinTradesNotMet => "MIN_TRADES_NOT_MET",
            Self::MinFeesNotMet => "MIN_FEES_NOT_MET",
            Self::InvalidRank => "INVALID_RANK",
            Self::VolumeNotMet { .. } => "VOLUME_NOT_MET",
        }
    }
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotTopTen => write!(f, "Not in the top ranks"),
            Self::MinTradesNotMet => write!(f, "Minimum trade count not reached"),
            Self::MinFeesNotMet => write!(f, "Minimum fees paid not reached"),
            Self::InvalidRank => write!(f, "No milestone for this rank"),
            Self::VolumeNotMet { required_usd, actual_usd, shortfall_usd } => write!(
                f,
                "Need ${required_usd} volume (have ${actual_usd}, ${shortfall_usd} to go)"
            ),
        }
    }
}

/// Outcome of a milestone check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MilestoneResult {
    /// The trader earned the rank's reward
    Eligible {
        /// Reward (USD)
        reward_usd: Decimal,
        /// Fee charged the following day
        next_day_fee_bps: u32,
    },
    /// The trader did not qualify
    Ineligible {
        /// First guard that failed
        reason: IneligibleReason,
    },
}

impl MilestoneResult {
    /// Whether a reward is due
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }

    fn ineligible(reason: IneligibleReason) -> Self {
        Self::Ineligible { reason }
    }
}

/// Validated milestone table and qualification thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneSchedule {
    milestones: Vec<VolumeMilestone>,
    top_rank: u32,
    min_trade_count: u32,
    min_fees_paid_usd: Decimal,
}

impl MilestoneSchedule {
    /// Build a schedule with the default thresholds
    ///
    /// Ranks must be unique and inside `1..=10`. A table may leave ranks out;
    /// those ranks report [`IneligibleReason::InvalidRank`].
    pub fn new(milestones: Vec<VolumeMilestone>) -> AppResult<Self> {
        Self::build(milestones, DEFAULT_TOP_RANK, DEFAULT_MIN_TRADE_COUNT, DEFAULT_MIN_FEES_PAID_USD)
    }

    /// Build a schedule from the `[milestones]` configuration section
    pub fn from_config(config: &MilestonesConfig) -> AppResult<Self> {
        Self::build(
            config.table.clone(),
            config.top_rank,
            config.min_trade_count,
            config.min_fees_paid_usd,
        )
    }

    fn build(
        mut milestones: Vec<VolumeMilestone>,
        top_rank: u32,
        min_trade_count: u32,
        min_fees_paid_usd: Decimal,
    ) -> AppResult<Self> {
        ensure!(top_rank >= 1, AppError::schedule(TABLE, "top rank must be at least 1"));
        ensure!(
            !min_fees_paid_usd.is_sign_negative(),
            AppError::schedule(TABLE, format!("minimum fees paid cannot be negative: {min_fees_paid_usd}"))
        );

        milestones.sort_by_key(|m| m.rank);
        for m in &milestones {
            ensure!(
                (1..=top_rank).contains(&m.rank),
                AppError::schedule(TABLE, format!("rank {} is outside 1..={top_rank}", m.rank))
            );
            ensure!(
                !m.min_volume_usd.is_sign_negative() && !m.reward_usd.is_sign_negative(),
                AppError::schedule(TABLE, format!("rank {} has a negative volume target or reward", m.rank))
            );
            ensure!(
                m.next_day_fee_bps <= MAX_FEE_BPS,
                AppError::schedule(TABLE, format!("rank {} next-day fee {} bps exceeds {MAX_FEE_BPS}", m.rank, m.next_day_fee_bps))
            );
        }
        for pair in milestones.windows(2) {
            ensure!(
                pair[0].rank != pair[1].rank,
                AppError::schedule(TABLE, format!("rank {} appears more than once", pair[0].rank))
            );
        }

        Ok(Self {
            milestones,
            top_rank,
            min_trade_count,
            min_fees_paid_usd,
        })
    }

    /// Milestones ordered by rank
    pub fn milestones(&self) -> &[VolumeMilestone] {
        &self.milestones
    }

    /// Worst rank that can still be rewarded
    pub fn top_rank(&self) -> u32 {
        self.top_rank
    }

    /// Ranks in `1..=top_rank` without a milestone
    pub fn missing_ranks(&self) -> Vec<u32> {
        (1..=self.top_rank).filter(|r| self.milestone_for(*r).is_none()).collect()
    }

    /// Milestone for a rank, if configured
    pub fn milestone_for(&self, rank: u32) -> Option<&VolumeMilestone> {
        self.milestones
            .binary_search_by_key(&rank, |m| m.rank)
            .ok()
            .map(|i| &self.milestones[i])
    }

    /// Decide whether a trader qualifies for their rank's reward
    ///
    /// Guards run in a fixed order and the first failure is reported:
    /// rank bracket, trade count, fees paid, milestone lookup, volume.
    pub fn check(
        &self,
        rank: i64,
        volume_usd: Decimal,
        trade_count: u32,
        total_fees_paid_usd: Decimal,
    ) -> MilestoneResult {
        let result = self.evaluate(rank, volume_usd, trade_count, total_fees_paid_usd);
        trace!(rank, %volume_usd, trade_count, %total_fees_paid_usd, ?result, "milestone checked");
        result
    }

    /// [`check`](Self::check) over a [`TradeStats`] record
    pub fn check_stats(&self, stats: &TradeStats) -> MilestoneResult {
        self.check(stats.rank, stats.volume_usd, stats.trade_count, stats.total_fees_paid_usd)
    }

    fn evaluate(
        &self,
        rank: i64,
        volume_usd: Decimal,
        trade_count: u32,
        total_fees_paid_usd: Decimal,
    ) -> MilestoneResult {
        let Some(rank) = u32::try_from(rank).ok().filter(|r| (1..=self.top_rank).contains(r)) else {
            return MilestoneResult::ineligible(IneligibleReason::NotTopTen);
        };
        if trade_count < self.min_trade_count {
            return MilestoneResult::ineligible(IneligibleReason::MinTradesNotMet);
        }
        if total_fees_paid_usd < self.min_fees_paid_usd {
            return MilestoneResult::ineligible(IneligibleReason::MinFeesNotMet);
        }

        let Some(milestone) = self.milestone_for(rank) else {
            return MilestoneResult::ineligible(IneligibleReason::InvalidRank);
        };

        if volume_usd < milestone.min_volume_usd {
            return MilestoneResult::ineligible(IneligibleReason::VolumeNotMet {
                required_usd: milestone.min_volume_usd,
                actual_usd: volume_usd,
                shortfall_usd: milestone.min_volume_usd - volume_usd,
            });
        }

        MilestoneResult::Eligible {
            reward_usd: milestone.reward_usd,
            next_day_fee_bps: milestone.next_day_fee_bps,
        }
    }
}

impl Default for MilestoneSchedule {
    fn default() -> Self {
        Self {
            milestones: default_milestones(),
            top_rank: DEFAULT_TOP_RANK,
            min_trade_count: DEFAULT_MIN_TRADE_COUNT,
            min_fees_paid_usd: DEFAULT_MIN_FEES_PAID_USD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn single_rank_schedule() -> MilestoneSchedule {
        MilestoneSchedule::new(vec![VolumeMilestone::new(1, dec!(250000), dec!(1000), 5)]).unwrap()
    }

    #[test]
    fn test_default_table_is_complete() {
        let schedule = MilestoneSchedule::new(default_milestones()).unwrap();
        assert_eq!(schedule, MilestoneSchedule::default());
        assert!(schedule.missing_ranks().is_empty());
    }

    #[test]
    fn test_rank_checked_first() {
        let schedule = MilestoneSchedule::default();
        assert_eq!(
            schedule.check(11, dec!(1000000), 100, dec!(1000)),
            MilestoneResult::Ineligible { reason: IneligibleReason::NotTopTen }
        );
        assert_eq!(
            schedule.check(0, dec!(1000000), 100, dec!(1000)),
            MilestoneResult::Ineligible { reason: IneligibleReason::NotTopTen }
        );
        assert_eq!(
            schedule.check(-1, dec!(1000000), 100, dec!(1000)),
            MilestoneResult::Ineligible { reason: IneligibleReason::NotTopTen }
        );
        assert_eq!(
            schedule.check(i64::MAX, dec!(1000000), 100, dec!(1000)),
            MilestoneResult::Ineligible { reason: IneligibleReason::NotTopTen }
        );
    }

    #[test]
    fn test_guard_order() {
        let schedule = MilestoneSchedule::default();

        // every guard fails after the rank; trade count wins
        assert_matches!(
            schedule.check(1, dec!(0), 4, dec!(0)),
            MilestoneResult::Ineligible { reason: IneligibleReason::MinTradesNotMet }
        );
        assert_matches!(
            schedule.check(1, dec!(0), 5, dec!(24.99)),
            MilestoneResult::Ineligible { reason: IneligibleReason::MinFeesNotMet }
        );
        assert_matches!(
            schedule.check(1, dec!(0), 5, dec!(25)),
            MilestoneResult::Ineligible { reason: IneligibleReason::VolumeNotMet { .. } }
        );
    }

    #[test]
    fn test_volume_boundary() {
        let schedule = single_rank_schedule();

        assert_eq!(
            schedule.check(1, dec!(250000), 5, dec!(25)),
            MilestoneResult::Eligible { reward_usd: dec!(1000), next_day_fee_bps: 5 }
        );

        let result = schedule.check(1, dec!(249999.99), 5, dec!(25));
        assert_eq!(
            result,
            MilestoneResult::Ineligible {
                reason: IneligibleReason::VolumeNotMet {
                    required_usd: dec!(250000),
                    actual_usd: dec!(249999.99),
                    shortfall_usd: dec!(0.01),
                }
            }
        );
    }

    #[test]
    fn test_missing_rank_is_invalid() {
        let schedule = single_rank_schedule();
        assert_eq!(schedule.missing_ranks(), (2..=10).collect::<Vec<_>>());
        assert_matches!(
            schedule.check(2, dec!(1000000), 50, dec!(500)),
            MilestoneResult::Ineligible { reason: IneligibleReason::InvalidRank }
        );
    }

    #[test]
    fn test_lower_ranks_share_targets() {
        let schedule = MilestoneSchedule::default();
        for rank in 8..=10 {
            assert_eq!(
                schedule.check(rank, dec!(50000), 5, dec!(25)),
                MilestoneResult::Eligible { reward_usd: dec!(200), next_day_fee_bps: 8 }
            );
        }
    }

    #[test]
    fn test_check_stats() {
        let stats = TradeStats {
            rank: 3,
            volume_usd: dec!(150000),
            trade_count: 12,
            total_fees_paid_usd: dec!(80),
        };
        assert!(MilestoneSchedule::default().check_stats(&stats).is_eligible());
    }

    #[test]
    fn test_rejects_bad_tables() {
        let duplicate = vec![
            VolumeMilestone::new(2, dec!(1), dec!(1), 5),
            VolumeMilestone::new(2, dec!(2), dec!(1), 5),
        ];
        assert_matches!(MilestoneSchedule::new(duplicate), Err(AppError::Schedule { .. }));

        let out_of_range = vec![VolumeMilestone::new(11, dec!(1), dec!(1), 5)];
        assert!(MilestoneSchedule::new(out_of_range).is_err());

        let zero_rank = vec![VolumeMilestone::new(0, dec!(1), dec!(1), 5)];
        assert!(MilestoneSchedule::new(zero_rank).is_err());

        let negative = vec![VolumeMilestone::new(1, dec!(-1), dec!(1), 5)];
        assert!(MilestoneSchedule::new(negative).is_err());
    }

    #[test]
    fn test_custom_thresholds() {
        let mut config = MilestonesConfig::default();
        config.top_rank = 3;
        config.min_trade_count = 1;
        config.min_fees_paid_usd = dec!(0);
        config.table = default_milestones().into_iter().take(3).collect();

        let schedule = MilestoneSchedule::from_config(&config).unwrap();
        assert_matches!(
            schedule.check(4, dec!(1000000), 100, dec!(1000)),
            MilestoneResult::Ineligible { reason: IneligibleReason::NotTopTen }
        );
        assert!(schedule.check(3, dec!(150000), 1, dec!(0)).is_eligible());
    }

    #[test]
    fn test_result_serialization() {
        let eligible = MilestoneResult::Eligible { reward_usd: dec!(1000), next_day_fee_bps: 5 };
        let json = serde_json::to_value(eligible).unwrap();
        assert_eq!(json["status"], "eligible");
        assert_eq!(json["next_day_fee_bps"], 5);

        let ineligible = MilestoneResult::Ineligible { reason: IneligibleReason::MinFeesNotMet };
        let json = serde_json::to_value(ineligible).unwrap();
        assert_eq!(json["status"], "ineligible");
        assert_eq!(json["reason"]["code"], "MIN_FEES_NOT_MET");
    }

    #[test]
    fn test_reason_codes_and_messages() {
        let reason = IneligibleReason::VolumeNotMet {
            required_usd: dec!(50000),
            actual_usd: dec!(42000),
            shortfall_usd: dec!(8000),
        };
        assert_eq!(reason.code(), "VOLUME_NOT_MET");
        assert_eq!(reason.to_string(), "Need $50000 volume (have $42000, $8000 to go)");
        assert_eq!(IneligibleReason::NotTopTen.code(), "NOT_TOP_TEN");
    }
}
