//! Holder fee tiers and per-swap fee selection
//!
//! The platform fee depends on how much of the reference token a wallet
//! holds (valued in USD). Tiers are kept highest threshold first; the first
//! tier whose threshold the holdings reach is the one that applies.
//! Ape Mode scales the tier fee up, promotional swaps bypass it entirely.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::models::FeesConfig;
use crate::core::arithmetic::{bps_to_percent, round_to_u32};
use crate::core::domain::fees::{DEFAULT_APE_MODE_MULTIPLIER, DEFAULT_PROMOTIONAL_FEE_BPS, MAX_FEE_BPS};
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::ensure;

const TABLE: &str = "fee_tiers";

/// One holdings bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTier {
    /// Smallest holdings (USD) that unlock this tier
    pub min_holdings_usd: Decimal,
    /// Fee charged in basis points
    pub fee_bps: u32,
    /// Discount shown to users, e.g. `−64%`
    #[serde(default)]
    pub discount_label: String,
}

impl FeeTier {
    /// Create a tier
    pub fn new<S: Into<String>>(min_holdings_usd: Decimal, fee_bps: u32, discount_label: S) -> Self {
        Self {
            min_holdings_usd,
            fee_bps,
            discount_label: discount_label.into(),
        }
    }
}

/// Production holder tiers, highest threshold first
pub fn default_fee_tiers() -> Vec<FeeTier> {
    vec![
        FeeTier::new(dec!(750000), 5, "−90%"),
        FeeTier::new(dec!(300000), 6, "−88%"),
        FeeTier::new(dec!(150000), 8, "−84%"),
        FeeTier::new(dec!(60000), 12, "−76%"),
        FeeTier::new(dec!(20000), 18, "−64%"),
        FeeTier::new(dec!(7500), 25, "−50%"),
        FeeTier::new(dec!(2500), 35, "−30%"),
        FeeTier::new(dec!(500), 45, "−10%"),
        FeeTier::new(dec!(0), 50, "—"),
    ]
}

/// Fee to charge on a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeDecision {
    /// Fee in basis points
    pub fee_bps: u32,
}

impl FeeDecision {
    /// Fee as a percentage (`18` bps → `0.18`)
    pub fn as_percent(&self) -> Decimal {
        bps_to_percent(self.fee_bps)
    }

    /// Whether the swap is free
    pub fn is_free(&self) -> bool {
        self.fee_bps == 0
    }
}

/// Tier context for progress bars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierView {
    /// Tier the holdings currently sit in
    pub current: FeeTier,
    /// Next tier up, `None` at the top
    pub next: Option<FeeTier>,
    /// Progress from `current` to `next`, 0..=100
    pub progress_to_next_pct: u8,
}

/// Validated holder tier table plus the mode adjustments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeSchedule {
    tiers: Vec<FeeTier>,
    ape_mode_multiplier: Decimal,
    promotional_fee_bps: u32,
}

impl FeeSchedule {
    /// Build a schedule from a tier table, rejecting tables that break the ordering rules
    pub fn new(tiers: Vec<FeeTier>) -> AppResult<Self> {
        Self::build(tiers, DEFAULT_APE_MODE_MULTIPLIER, DEFAULT_PROMOTIONAL_FEE_BPS)
    }

    /// Build a schedule from the `[fees]` configuration section
    pub fn from_config(config: &FeesConfig) -> AppResult<Self> {
        Self::build(config.tiers.clone(), config.ape_mode_multiplier, config.promotional_fee_bps)
    }

    fn build(tiers: Vec<FeeTier>, ape_mode_multiplier: Decimal, promotional_fee_bps: u32) -> AppResult<Self> {
        validate_tiers(&tiers)?;

        let schedule = Self {
            tiers,
            ape_mode_multiplier: DEFAULT_APE_MODE_MULTIPLIER,
            promotional_fee_bps: DEFAULT_PROMOTIONAL_FEE_BPS,
        };
        schedule
            .with_ape_mode_multiplier(ape_mode_multiplier)?
            .with_promotional_fee_bps(promotional_fee_bps)
    }

    /// Override the Ape Mode multiplier
    pub fn with_ape_mode_multiplier(mut self, multiplier: Decimal) -> AppResult<Self> {
        ensure!(
            !multiplier.is_sign_negative(),
            AppError::schedule(TABLE, format!("Ape Mode multiplier cannot be negative: {multiplier}"))
        );
        self.ape_mode_multiplier = multiplier;
        Ok(self)
    }

    /// Override the promotional swap fee
    pub fn with_promotional_fee_bps(mut self, fee_bps: u32) -> AppResult<Self> {
        ensure!(
            fee_bps <= MAX_FEE_BPS,
            AppError::schedule(TABLE, format!("Promotional fee out of range: {fee_bps} bps"))
        );
        self.promotional_fee_bps = fee_bps;
        Ok(self)
    }

    /// Tiers, highest threshold first
    pub fn tiers(&self) -> &[FeeTier] {
        &self.tiers
    }

    /// Ape Mode multiplier in effect
    pub fn ape_mode_multiplier(&self) -> Decimal {
        self.ape_mode_multiplier
    }

    /// Fee charged on promotional swaps
    pub fn promotional_fee_bps(&self) -> u32 {
        self.promotional_fee_bps
    }

    /// The catch-all zero-holdings tier
    pub fn base_tier(&self) -> &FeeTier {
        // validate_tiers guarantees a non-empty table
        &self.tiers[self.tiers.len() - 1]
    }

    /// Tier that applies to the given holdings
    pub fn tier_for(&self, holdings_usd: Decimal) -> &FeeTier {
        &self.tiers[self.tier_index(holdings_usd)]
    }

    /// Fee for a swap
    ///
    /// A promotional swap is charged the promotional fee regardless of holdings
    /// or Ape Mode. Otherwise the holdings tier fee applies, scaled by the Ape
    /// Mode multiplier when the mode is on.
    pub fn fee_bps(&self, holdings_usd: Decimal, ape_mode_enabled: bool, is_promotional_swap: bool) -> FeeDecision {
        if is_promotional_swap {
            trace!(fee_bps = self.promotional_fee_bps, "promotional swap");
            return FeeDecision { fee_bps: self.promotional_fee_bps };
        }

        let tier = self.tier_for(holdings_usd);
        let fee_bps = if ape_mode_enabled {
            self.apply_ape_mode(tier.fee_bps)
        } else {
            tier.fee_bps
        };

        trace!(
            %holdings_usd,
            tier_min_usd = %tier.min_holdings_usd,
            base_fee_bps = tier.fee_bps,
            ape_mode_enabled,
            fee_bps,
            "fee selected"
        );
        FeeDecision { fee_bps }
    }

    /// Scale a base fee by the Ape Mode multiplier, rounding half-up
    ///
    /// The result may exceed the highest unmultiplied fee; it saturates at
    /// `u32::MAX`.
    pub fn apply_ape_mode(&self, base_fee_bps: u32) -> u32 {
        Decimal::from(base_fee_bps)
            .checked_mul(self.ape_mode_multiplier)
            .map_or(u32::MAX, round_to_u32)
    }

    /// Current tier, next tier, and progress between them
    pub fn tier_view(&self, holdings_usd: Decimal) -> TierView {
        let holdings_usd = clamp_holdings(holdings_usd);
        let index = self.tier_index(holdings_usd);
        let current = &self.tiers[index];
        let next = index.checked_sub(1).map(|i| &self.tiers[i]);

        let progress_to_next_pct = match next {
            None => 100,
            Some(next) => {
                // tier_index takes the first match, so the next tier's
                // threshold is always strictly above the current one
                let range = next.min_holdings_usd - current.min_holdings_usd;
                let fraction = ((holdings_usd - current.min_holdings_usd) / range)
                    .clamp(Decimal::ZERO, Decimal::ONE);
                // fraction is within [0, 1], so the percentage fits in a u8
                u8::try_from(round_to_u32(fraction * Decimal::ONE_HUNDRED)).unwrap_or(100)
            }
        };

        TierView {
            current: current.clone(),
            next: next.cloned(),
            progress_to_next_pct,
        }
    }

    /// Percentage saved against the catch-all tier fee
    pub fn discount_pct(&self, fee_bps: u32) -> u32 {
        let base = self.base_tier().fee_bps;
        if base == 0 || fee_bps >= base {
            return 0;
        }
        let saved = Decimal::from(base - fee_bps) / Decimal::from(base);
        round_to_u32(saved * Decimal::ONE_HUNDRED)
    }

    /// Highest fee a non-promotional swap can be charged
    pub fn max_ape_mode_fee_bps(&self) -> u32 {
        let highest = self.tiers.iter().map(|t| t.fee_bps).max().unwrap_or(0);
        self.apply_ape_mode(highest)
    }

    fn tier_index(&self, holdings_usd: Decimal) -> usize {
        let holdings_usd = clamp_holdings(holdings_usd);
        self.tiers
            .iter()
            .position(|tier| holdings_usd >= tier.min_holdings_usd)
            .unwrap_or(self.tiers.len() - 1)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            tiers: default_fee_tiers(),
            ape_mode_multiplier: DEFAULT_APE_MODE_MULTIPLIER,
            promotional_fee_bps: DEFAULT_PROMOTIONAL_FEE_BPS,
        }
    }
}

fn clamp_holdings(holdings_usd: Decimal) -> Decimal {
    holdings_usd.max(Decimal::ZERO)
}

/// Check the tier table invariants
///
/// Thresholds must be non-negative and sorted highest first, the last tier
/// must start at zero, and a higher threshold may never charge more.
pub fn validate_tiers(tiers: &[FeeTier]) -> AppResult<()> {
    ensure!(!tiers.is_empty(), AppError::schedule(TABLE, "tier table is empty"));

    for (i, tier) in tiers.iter().enumerate() {
        ensure!(
            !tier.min_holdings_usd.is_sign_negative(),
            AppError::schedule(TABLE, format!("tier {i} has a negative threshold {}", tier.min_holdings_usd))
        );
        ensure!(
            tier.fee_bps <= MAX_FEE_BPS,
            AppError::schedule(TABLE, format!("tier {i} fee {} bps exceeds {MAX_FEE_BPS}", tier.fee_bps))
        );
    }

    for (i, pair) in tiers.windows(2).enumerate() {
        let (higher, lower) = (&pair[0], &pair[1]);
        ensure!(
            higher.min_holdings_usd >= lower.min_holdings_usd,
            AppError::schedule(
                TABLE,
                format!(
                    "tiers must be sorted by threshold descending: {} comes before {} at position {}",
                    higher.min_holdings_usd,
                    lower.min_holdings_usd,
                    i + 1
                )
            )
        );
        ensure!(
            higher.fee_bps <= lower.fee_bps,
            AppError::schedule(
                TABLE,
                format!(
                    "tier at {} charges {} bps, more than the {} bps of the lower tier at {}",
                    higher.min_holdings_usd, higher.fee_bps, lower.fee_bps, lower.min_holdings_usd
                )
            )
        );
    }

    let last = &tiers[tiers.len() - 1];
    ensure!(
        last.min_holdings_usd.is_zero(),
        AppError::schedule(TABLE, format!("last tier must start at 0, found {}", last.min_holdings_usd))
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn usd(cents: u64) -> Decimal {
        Decimal::new(i64::try_from(cents).unwrap(), 2)
    }

    #[test]
    fn test_default_table_is_valid() {
        assert!(validate_tiers(&default_fee_tiers()).is_ok());
        assert_eq!(FeeSchedule::new(default_fee_tiers()).unwrap(), FeeSchedule::default());
    }

    #[test]
    fn test_tier_selection_at_thresholds() {
        let schedule = FeeSchedule::default();

        assert_eq!(schedule.fee_bps(dec!(0), false, false).fee_bps, 50);
        assert_eq!(schedule.fee_bps(dec!(499.99), false, false).fee_bps, 50);
        assert_eq!(schedule.fee_bps(dec!(500), false, false).fee_bps, 45);
        assert_eq!(schedule.fee_bps(dec!(19999.99), false, false).fee_bps, 25);
        assert_eq!(schedule.fee_bps(dec!(20000), false, false).fee_bps, 18);
        assert_eq!(schedule.fee_bps(dec!(750000), false, false).fee_bps, 5);
        assert_eq!(schedule.fee_bps(Decimal::MAX, false, false).fee_bps, 5);
    }

    #[test]
    fn test_negative_holdings_use_zero_tier() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.fee_bps(dec!(-1000), false, false).fee_bps, 50);
        assert_eq!(schedule.tier_view(dec!(-1000)).current.min_holdings_usd, dec!(0));
    }

    #[test]
    fn test_ape_mode_rounds_half_up() {
        let schedule = FeeSchedule::default();

        assert_eq!(schedule.fee_bps(dec!(20000), true, false).fee_bps, 27);
        // 45 * 1.5 = 67.5
        assert_eq!(schedule.fee_bps(dec!(500), true, false).fee_bps, 68);
        // 25 * 1.5 = 37.5
        assert_eq!(schedule.fee_bps(dec!(7500), true, false).fee_bps, 38);
        // surcharge may exceed the highest unmultiplied fee
        assert_eq!(schedule.fee_bps(dec!(0), true, false).fee_bps, 75);
    }

    #[test]
    fn test_promotional_swap_overrides_everything() {
        let schedule = FeeSchedule::default();
        assert!(schedule.fee_bps(dec!(0), true, true).is_free());
        assert!(schedule.fee_bps(dec!(1000000), false, true).is_free());

        let promo = FeeSchedule::default().with_promotional_fee_bps(3).unwrap();
        assert_eq!(promo.fee_bps(dec!(0), true, true).fee_bps, 3);
    }

    #[test]
    fn test_tier_view_progress() {
        let schedule = FeeSchedule::default();

        let view = schedule.tier_view(dec!(10000));
        assert_eq!(view.current.fee_bps, 25);
        assert_eq!(view.next.as_ref().map(|t| t.fee_bps), Some(18));
        // (10000 - 7500) / (20000 - 7500) = 0.2
        assert_eq!(view.progress_to_next_pct, 20);

        let bottom = schedule.tier_view(dec!(0));
        assert_eq!(bottom.current.fee_bps, 50);
        assert_eq!(bottom.progress_to_next_pct, 0);

        let top = schedule.tier_view(dec!(5000000));
        assert_eq!(top.current.fee_bps, 5);
        assert!(top.next.is_none());
        assert_eq!(top.progress_to_next_pct, 100);
    }

    #[test]
    fn test_tier_view_rounds_progress_half_up() {
        let schedule = FeeSchedule::new(vec![
            FeeTier::new(dec!(200), 10, ""),
            FeeTier::new(dec!(0), 20, ""),
        ])
        .unwrap();

        // 1 / 200 = 0.5%
        assert_eq!(schedule.tier_view(dec!(1)).progress_to_next_pct, 1);
        assert_eq!(schedule.tier_view(dec!(0.98)).progress_to_next_pct, 0);
    }

    #[test]
    fn test_tier_view_ignores_modes() {
        let schedule = FeeSchedule::default().with_promotional_fee_bps(0).unwrap();
        let view = schedule.tier_view(dec!(20000));
        assert_eq!(view.current.fee_bps, 18);
    }

    #[test]
    fn test_discount_pct() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.discount_pct(50), 0);
        assert_eq!(schedule.discount_pct(18), 64);
        assert_eq!(schedule.discount_pct(5), 90);
        assert_eq!(schedule.discount_pct(0), 100);
        assert_eq!(schedule.discount_pct(75), 0);
    }

    #[test]
    fn test_rejects_unsorted_table() {
        let tiers = vec![
            FeeTier::new(dec!(0), 50, ""),
            FeeTier::new(dec!(500), 45, ""),
        ];
        assert_matches!(FeeSchedule::new(tiers), Err(AppError::Schedule { .. }));
    }

    #[test]
    fn test_rejects_missing_catch_all() {
        let tiers = vec![
            FeeTier::new(dec!(1000), 20, ""),
            FeeTier::new(dec!(10), 50, ""),
        ];
        let err = FeeSchedule::new(tiers).unwrap_err();
        assert!(err.to_string().contains("must start at 0"));
    }

    #[test]
    fn test_rejects_fee_increasing_with_holdings() {
        let tiers = vec![
            FeeTier::new(dec!(1000), 60, ""),
            FeeTier::new(dec!(0), 50, ""),
        ];
        assert_matches!(FeeSchedule::new(tiers), Err(AppError::Schedule { .. }));
    }

    #[test]
    fn test_rejects_empty_and_out_of_range() {
        assert!(FeeSchedule::new(Vec::new()).is_err());
        assert!(FeeSchedule::new(vec![FeeTier::new(dec!(0), 10_001, "")]).is_err());
        assert!(FeeSchedule::new(vec![FeeTier::new(dec!(-1), 10, "")]).is_err());
    }

    #[test]
    fn test_ape_mode_may_exceed_max_fee() {
        let schedule = FeeSchedule::new(vec![
            FeeTier::new(dec!(1000), 7000, ""),
            FeeTier::new(dec!(0), 8000, ""),
        ])
        .unwrap();

        assert_eq!(schedule.fee_bps(dec!(0), true, false).fee_bps, 12000);
        assert_eq!(schedule.fee_bps(dec!(1000), true, false).fee_bps, 10500);
        assert_eq!(schedule.max_ape_mode_fee_bps(), 12000);

        let huge = schedule.clone().with_ape_mode_multiplier(Decimal::MAX).unwrap();
        assert_eq!(huge.fee_bps(dec!(0), true, false).fee_bps, u32::MAX);

        assert!(schedule.with_ape_mode_multiplier(dec!(-1)).is_err());
    }

    #[test]
    fn test_tier_view_with_equal_thresholds() {
        let schedule = FeeSchedule::new(vec![
            FeeTier::new(dec!(1000), 10, "first"),
            FeeTier::new(dec!(1000), 20, "shadowed"),
            FeeTier::new(dec!(0), 30, ""),
        ])
        .unwrap();

        let at_threshold = schedule.tier_view(dec!(1000));
        assert_eq!(at_threshold.current.discount_label, "first");
        assert!(at_threshold.next.is_none());

        let below = schedule.tier_view(dec!(500));
        assert_eq!(below.current.fee_bps, 30);
        assert_eq!(below.next.as_ref().map(|t| t.fee_bps), Some(20));
        assert_eq!(below.progress_to_next_pct, 50);
    }

    #[test]
    fn test_from_config() {
        let mut config = FeesConfig::default();
        config.ape_mode_multiplier = dec!(2);
        config.promotional_fee_bps = 1;

        let schedule = FeeSchedule::from_config(&config).unwrap();
        assert_eq!(schedule.fee_bps(dec!(20000), true, false).fee_bps, 36);
        assert_eq!(schedule.fee_bps(dec!(20000), true, true).fee_bps, 1);
    }

    #[test]
    fn test_fee_decision_percent() {
        let decision = FeeDecision { fee_bps: 18 };
        assert_eq!(decision.as_percent(), dec!(0.18));
        assert!(!decision.is_free());
    }

    proptest! {
        #[test]
        fn prop_fee_never_increases_with_holdings(a in 0u64..200_000_000, b in 0u64..200_000_000) {
            let schedule = FeeSchedule::default();
            let (low, high) = if a <= b { (usd(a), usd(b)) } else { (usd(b), usd(a)) };
            prop_assert!(
                schedule.fee_bps(low, false, false).fee_bps >= schedule.fee_bps(high, false, false).fee_bps
            );
        }

        #[test]
        fn prop_promotional_dominates(cents in 0u64..200_000_000, ape in any::<bool>()) {
            let schedule = FeeSchedule::default();
            prop_assert_eq!(schedule.fee_bps(usd(cents), ape, true).fee_bps, 0);
        }

        #[test]
        fn prop_ape_mode_scales_base_fee(cents in 0u64..200_000_000) {
            let schedule = FeeSchedule::default();
            let base = schedule.fee_bps(usd(cents), false, false).fee_bps;
            let expected = round_to_u32(Decimal::from(base) * dec!(1.5));
            prop_assert_eq!(schedule.fee_bps(usd(cents), true, false).fee_bps, expected);
        }

        #[test]
        fn prop_progress_in_range(cents in 0u64..u64::MAX / 2) {
            let view = FeeSchedule::default().tier_view(usd(cents));
            prop_assert!(view.progress_to_next_pct <= 100);
            prop_assert!(view.current.min_holdings_usd <= usd(cents));
        }
    }
}
