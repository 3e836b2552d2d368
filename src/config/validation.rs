//! Configuration validation logic
//!
//! The schedules re-check their own invariants when the engine is built;
//! this pass exists to report every problem in one go, and to surface the
//! table shapes that are legal but probably unintended as warnings.

use tracing::{debug, warn};

use crate::core::domain::fees::MAX_FEE_BPS;
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::services::fees::FeeSchedule;
use crate::services::milestones::MilestoneSchedule;
use crate::services::rewards::RewardPolicy;
use crate::utils::validation;
use super::models::{AppConfig, EnvironmentConfig, FeesConfig, MilestonesConfig, ReferralsConfig, RewardsConfig};

/// Configuration validator
pub struct ConfigValidator {
    /// Strict validation mode (fails on warnings)
    strict_mode: bool,

    /// Collect all validation errors instead of failing fast
    collect_all_errors: bool,
}

/// Validation result with warnings and errors
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Fatal validation errors
    pub errors: Vec<String>,

    /// Non-fatal warnings
    pub warnings: Vec<String>,

    /// Validation passed
    pub is_valid: bool,
}

impl ConfigValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            strict_mode: false,
            collect_all_errors: true,
        }
    }

    /// Enable strict validation mode
    pub fn with_strict_mode(mut self) -> Self {
        self.strict_mode = true;
        self
    }

    /// Enable fail-fast mode (stop on first error)
    pub fn with_fail_fast(mut self) -> Self {
        self.collect_all_errors = false;
        self
    }

    /// Validate the complete application configuration
    pub fn validate(&self, config: &AppConfig) -> AppResult<ValidationResult> {
        debug!("🔍 Starting configuration validation");

        let mut result = ValidationResult {
            is_valid: true,
            ..Default::default()
        };

        self.validate_environment(&config.environment, &mut result)?;
        self.validate_fees(&config.fees, &mut result)?;
        self.validate_milestones(&config.milestones, &mut result)?;
        self.validate_rewards(&config.rewards, &mut result)?;
        self.validate_referrals(&config.referrals, &mut result)?;
        self.validate_cross_config(config, &mut result)?;

        result.is_valid = result.errors.is_empty() && (!self.strict_mode || result.warnings.is_empty());

        if result.is_valid {
            debug!("✅ Configuration validation passed");
        } else {
            warn!("❌ Configuration validation failed");
            for error in &result.errors {
                warn!("   Error: {}", error);
            }
            for warning in &result.warnings {
                warn!("   Warning: {}", warning);
            }
        }

        Ok(result)
    }

    fn validate_environment(&self, config: &EnvironmentConfig, result: &mut ValidationResult) -> AppResult<()> {
        if let Err(e) = validation::config::validate_environment(&config.name) {
            self.add_error(result, format!("Environment name: {}", e))?;
        }
        if let Err(e) = validation::config::validate_log_level(&config.log_level) {
            self.add_error(result, format!("Log level: {}", e))?;
        }
        if let Err(e) = validation::config::validate_log_format(&config.log_format) {
            self.add_error(result, format!("Log format: {}", e))?;
        }

        if config.debug_mode && config.name == "production" {
            self.add_warning(result, "Debug mode enabled in production environment");
        }

        Ok(())
    }

    fn validate_fees(&self, config: &FeesConfig, result: &mut ValidationResult) -> AppResult<()> {
        match FeeSchedule::from_config(config) {
            Ok(schedule) => {
                let surcharged = schedule.max_ape_mode_fee_bps();
                if surcharged > MAX_FEE_BPS {
                    self.add_warning(
                        result,
                        &format!("Fees: Ape Mode can charge {} bps, above {} bps", surcharged, MAX_FEE_BPS),
                    );
                }
            }
            Err(e) => self.add_error(result, format!("Fees: {}", e))?,
        }

        let thresholds = config.tiers.iter().map(|t| t.min_holdings_usd);
        for threshold in validation::find_duplicates(thresholds) {
            self.add_warning(
                result,
                &format!("Fees: several tiers start at ${}, only the first is reachable", threshold),
            );
        }

        if config.ape_mode_multiplier < rust_decimal::Decimal::ONE && !config.ape_mode_multiplier.is_sign_negative() {
            self.add_warning(result, "Fees: Ape Mode multiplier below 1 makes Ape Mode cheaper than a normal swap");
        }

        if let Some(base) = config.tiers.last() {
            if config.promotional_fee_bps > base.fee_bps {
                self.add_warning(result, "Fees: promotional fee is higher than the base tier fee");
            }
        }

        Ok(())
    }

    fn validate_milestones(&self, config: &MilestonesConfig, result: &mut ValidationResult) -> AppResult<()> {
        match MilestoneSchedule::from_config(config) {
            Ok(schedule) => {
                let missing = schedule.missing_ranks();
                if !missing.is_empty() {
                    self.add_warning(
                        result,
                        &format!("Milestones: no reward configured for ranks {:?}", missing),
                    );
                }
            }
            Err(e) => self.add_error(result, format!("Milestones: {}", e))?,
        }

        if config.min_trade_count == 0 {
            self.add_warning(result, "Milestones: minimum trade count is 0");
        }

        Ok(())
    }

    fn validate_rewards(&self, config: &RewardsConfig, result: &mut ValidationResult) -> AppResult<()> {
        if let Err(e) = RewardPolicy::from_config(config) {
            self.add_error(result, format!("Rewards: {}", e))?;
        }

        if config.trader_xp_per_usd.is_zero() {
            self.add_warning(result, "Rewards: traders earn no XP");
        }

        Ok(())
    }

    fn validate_referrals(&self, config: &ReferralsConfig, result: &mut ValidationResult) -> AppResult<()> {
        if let Err(e) = validation::config::validate_code_prefix(&config.code_prefix) {
            self.add_error(result, format!("Referrals: {}", e))?;
        }
        if config.leaderboard_size == 0 {
            self.add_error(result, "Referrals: leaderboard size must be at least 1".to_string())?;
        }

        Ok(())
    }

    /// Cross-configuration validation
    fn validate_cross_config(&self, config: &AppConfig, result: &mut ValidationResult) -> AppResult<()> {
        // Milestone ranks come from the leaderboard
        if (config.referrals.leaderboard_size as u64) < u64::from(config.milestones.top_rank) {
            self.add_warning(
                result,
                &format!(
                    "Leaderboard shows {} traders but milestones pay down to rank {}",
                    config.referrals.leaderboard_size, config.milestones.top_rank
                ),
            );
        }

        if config.is_production() && config.fees.promotional_fee_bps > 0 {
            self.add_warning(result, "Promotional swaps are not free in production");
        }

        Ok(())
    }

    /// Add an error to the validation result
    fn add_error(&self, result: &mut ValidationResult, message: String) -> AppResult<()> {
        result.is_valid = false;

        if !self.collect_all_errors {
            return Err(AppError::validation(message));
        }

        result.errors.push(message);
        Ok(())
    }

    /// Add a warning to the validation result
    fn add_warning(&self, result: &mut ValidationResult, message: &str) {
        result.warnings.push(message.to_string());

        if self.strict_mode {
            result.is_valid = false;
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Validate this configuration using the default validator
    pub fn validate(&self) -> AppResult<ValidationResult> {
        ConfigValidator::new().validate(self)
    }

    /// Validate this configuration with strict mode
    pub fn validate_strict(&self) -> AppResult<ValidationResult> {
        ConfigValidator::new().with_strict_mode().validate(self)
    }

    /// Quick validation that returns only a boolean result
    pub fn is_valid(&self) -> bool {
        self.validate().map(|r| r.is_valid).unwrap_or(false)
    }

    /// Validate and return errors if any
    pub fn validation_errors(&self) -> Vec<String> {
        self.validate()
            .map(|r| r.errors)
            .unwrap_or_else(|e| vec![e.to_string()])
    }

    /// Validate and return warnings if any
    pub fn validation_warnings(&self) -> Vec<String> {
        self.validate()
            .map(|r| r.warnings)
            .unwrap_or_default()
    }
}
