//! Configuration data structures and models
//!
//! Every section falls back to the production tables when omitted, so an
//! empty configuration file yields the live fee schedule.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::domain::{fees, milestones, rewards};
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::services::fees::{default_fee_tiers, FeeTier};
use crate::services::milestones::{default_milestones, VolumeMilestone};

/// Main application configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Holder fee tiers and swap modifiers
    #[serde(default)]
    pub fees: FeesConfig,

    /// Daily volume milestone rewards
    #[serde(default)]
    pub milestones: MilestonesConfig,

    /// XP and referral rates
    #[serde(default)]
    pub rewards: RewardsConfig,

    /// Referral code and leaderboard presentation
    #[serde(default)]
    pub referrals: ReferralsConfig,

    /// Profile applied on top of the base file
    #[serde(default)]
    pub profile: Option<ProfileConfig>,
}

/// Environment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Environment name (development, staging, production, test)
    #[serde(default = "default_environment_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (json, pretty, compact)
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Enable debug mode
    #[serde(default)]
    pub debug_mode: bool,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_directory: Option<String>,
}

/// Holder fee configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesConfig {
    /// Tiers ordered from the highest threshold down to the zero tier
    #[serde(default = "default_fee_tiers")]
    pub tiers: Vec<FeeTier>,

    /// Surcharge multiplier applied in Ape Mode
    #[serde(default = "default_ape_mode_multiplier")]
    pub ape_mode_multiplier: Decimal,

    /// Fee charged on promotional swaps
    #[serde(default)]
    pub promotional_fee_bps: u32,
}

/// Milestone reward configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestonesConfig {
    /// Reward per leaderboard rank
    #[serde(default = "default_milestones")]
    pub table: Vec<VolumeMilestone>,

    /// Worst rank that can earn a reward
    #[serde(default = "default_top_rank")]
    pub top_rank: u32,

    /// Minimum trades in the period
    #[serde(default = "default_min_trade_count")]
    pub min_trade_count: u32,

    /// Minimum platform fees paid in the period (USD)
    #[serde(default = "default_min_fees_paid_usd")]
    pub min_fees_paid_usd: Decimal,
}

/// XP and referral rate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// XP per USD of the trader's own volume
    #[serde(default = "default_trader_xp_per_usd")]
    pub trader_xp_per_usd: Decimal,

    /// Share of a referred trader's fee paid to the referrer
    #[serde(default = "default_referral_fee_share")]
    pub referral_fee_share: Decimal,

    /// Referrer XP per USD of the referred trader's volume
    #[serde(default = "default_referral_xp_per_usd")]
    pub referral_xp_per_usd: Decimal,
}

/// Referral presentation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralsConfig {
    /// Prefix for generated referral codes
    #[serde(default = "default_code_prefix")]
    pub code_prefix: String,

    /// Number of traders shown on the leaderboard
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

/// Named set of overrides, loaded from `configs/profiles/<name>.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile name
    pub name: String,

    /// Profile description
    #[serde(default)]
    pub description: String,

    /// Profile version
    #[serde(default)]
    pub version: String,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Dotted-key overrides, e.g. `fees.ape_mode_multiplier: 2.0`
    #[serde(default)]
    pub overrides: HashMap<String, serde_yaml::Value>,
}

fn default_environment_name() -> String { "development".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }
fn default_ape_mode_multiplier() -> Decimal { fees::DEFAULT_APE_MODE_MULTIPLIER }
fn default_top_rank() -> u32 { milestones::DEFAULT_TOP_RANK }
fn default_min_trade_count() -> u32 { milestones::DEFAULT_MIN_TRADE_COUNT }
fn default_min_fees_paid_usd() -> Decimal { milestones::DEFAULT_MIN_FEES_PAID_USD }
fn default_trader_xp_per_usd() -> Decimal { rewards::DEFAULT_TRADER_XP_PER_USD }
fn default_referral_fee_share() -> Decimal { rewards::DEFAULT_REFERRAL_FEE_SHARE }
fn default_referral_xp_per_usd() -> Decimal { rewards::DEFAULT_REFERRAL_XP_PER_USD }
fn default_code_prefix() -> String { rewards::DEFAULT_REFERRAL_CODE_PREFIX.to_string() }
fn default_leaderboard_size() -> usize { rewards::DEFAULT_LEADERBOARD_SIZE }

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: default_environment_name(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            debug_mode: false,
            log_directory: None,
        }
    }
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            tiers: default_fee_tiers(),
            ape_mode_multiplier: default_ape_mode_multiplier(),
            promotional_fee_bps: fees::DEFAULT_PROMOTIONAL_FEE_BPS,
        }
    }
}

impl Default for MilestonesConfig {
    fn default() -> Self {
        Self {
            table: default_milestones(),
            top_rank: default_top_rank(),
            min_trade_count: default_min_trade_count(),
            min_fees_paid_usd: default_min_fees_paid_usd(),
        }
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            trader_xp_per_usd: default_trader_xp_per_usd(),
            referral_fee_share: default_referral_fee_share(),
            referral_xp_per_usd: default_referral_xp_per_usd(),
        }
    }
}

impl Default for ReferralsConfig {
    fn default() -> Self {
        Self {
            code_prefix: default_code_prefix(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

impl AppConfig {
    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.name == "development"
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.name == "production"
    }

    /// Get the current environment name
    pub fn environment(&self) -> &str {
        &self.environment.name
    }

    /// Apply profile-specific overrides
    pub fn apply_profile_overrides(&mut self, profile: ProfileConfig) -> AppResult<()> {
        // Sorted so a failing key is reported deterministically
        let mut overrides: Vec<_> = profile.overrides.clone().into_iter().collect();
        overrides.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, value) in overrides {
            self.apply_override(&key, value)?;
        }

        self.profile = Some(profile);
        Ok(())
    }

    /// Apply a single dotted-key override, e.g. `fees.promotional_fee_bps`
    pub fn apply_override(&mut self, key: &str, value: serde_yaml::Value) -> AppResult<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["environment", field] => self.apply_environment_override(field, value)?,
            ["fees", field] => self.apply_fees_override(field, value)?,
            ["milestones", field] => self.apply_milestones_override(field, value)?,
            ["rewards", field] => self.apply_rewards_override(field, value)?,
            ["referrals", field] => self.apply_referrals_override(field, value)?,
            _ => {
                tracing::warn!("Unknown configuration override key: {}", key);
            }
        }

        Ok(())
    }

    fn apply_environment_override(&mut self, field: &str, value: serde_yaml::Value) -> AppResult<()> {
        let env = &mut self.environment;
        match field {
            "name" => env.name = parse_override("environment.name", value)?,
            "log_level" => env.log_level = parse_override("environment.log_level", value)?,
            "log_format" => env.log_format = parse_override("environment.log_format", value)?,
            "debug_mode" => env.debug_mode = parse_override("environment.debug_mode", value)?,
            "log_directory" => env.log_directory = parse_override("environment.log_directory", value)?,
            _ => {
                tracing::warn!("Unknown environment configuration field: {}", field);
            }
        }
        Ok(())
    }

    fn apply_fees_override(&mut self, field: &str, value: serde_yaml::Value) -> AppResult<()> {
        match field {
            "tiers" => self.fees.tiers = parse_override("fees.tiers", value)?,
            "ape_mode_multiplier" => self.fees.ape_mode_multiplier = parse_override("fees.ape_mode_multiplier", value)?,
            "promotional_fee_bps" => self.fees.promotional_fee_bps = parse_override("fees.promotional_fee_bps", value)?,
            _ => {
                tracing::warn!("Unknown fees configuration field: {}", field);
            }
        }
        Ok(())
    }

    fn apply_milestones_override(&mut self, field: &str, value: serde_yaml::Value) -> AppResult<()> {
        let cfg = &mut self.milestones;
        match field {
            "table" => cfg.table = parse_override("milestones.table", value)?,
            "top_rank" => cfg.top_rank = parse_override("milestones.top_rank", value)?,
            "min_trade_count" => cfg.min_trade_count = parse_override("milestones.min_trade_count", value)?,
            "min_fees_paid_usd" => cfg.min_fees_paid_usd = parse_override("milestones.min_fees_paid_usd", value)?,
            _ => {
                tracing::warn!("Unknown milestones configuration field: {}", field);
            }
        }
        Ok(())
    }

    fn apply_rewards_override(&mut self, field: &str, value: serde_yaml::Value) -> AppResult<()> {
        let cfg = &mut self.rewards;
        match field {
            "trader_xp_per_usd" => cfg.trader_xp_per_usd = parse_override("rewards.trader_xp_per_usd", value)?,
            "referral_fee_share" => cfg.referral_fee_share = parse_override("rewards.referral_fee_share", value)?,
            "referral_xp_per_usd" => cfg.referral_xp_per_usd = parse_override("rewards.referral_xp_per_usd", value)?,
            _ => {
                tracing::warn!("Unknown rewards configuration field: {}", field);
            }
        }
        Ok(())
    }

    fn apply_referrals_override(&mut self, field: &str, value: serde_yaml::Value) -> AppResult<()> {
        match field {
            "code_prefix" => self.referrals.code_prefix = parse_override("referrals.code_prefix", value)?,
            "leaderboard_size" => self.referrals.leaderboard_size = parse_override("referrals.leaderboard_size", value)?,
            _ => {
                tracing::warn!("Unknown referrals configuration field: {}", field);
            }
        }
        Ok(())
    }
}

fn parse_override<T: DeserializeOwned>(key: &str, value: serde_yaml::Value) -> AppResult<T> {
    serde_yaml::from_value(value)
        .map_err(|e| AppError::config(format!("Invalid value for override '{}': {}", key, e)))
}
