//! Services layer module
//!
//! Pure fee, milestone and reward calculators plus the [`FeeEngine`] that
//! bundles them. Nothing here performs I/O; wallet balances, price lookups
//! and persistence are the caller's concern.

pub mod engine;
pub mod fees;
pub mod leaderboard;
pub mod milestones;
pub mod referrals;
pub mod rewards;

// Re-export commonly used types
pub use engine::FeeEngine;
pub use fees::{default_fee_tiers, validate_tiers, FeeDecision, FeeSchedule, FeeTier, TierView};
pub use leaderboard::{Leaderboard, RankedTrader, TraderStanding};
pub use milestones::{default_milestones, IneligibleReason, MilestoneResult, MilestoneSchedule, VolumeMilestone};
pub use referrals::{
    generate_referral_code, normalize_referral_code, validate_referral, ReferralRejection, ReferralSplit,
};
pub use rewards::{RewardPolicy, TradeSettlement};
