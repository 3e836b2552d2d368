//! Main application structure
//!
//! `Application` owns the validated configuration and the engine built from
//! it, and turns each command-line [`Command`] into a JSON document.

use serde_json::{json, Value};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::AppConfig;
use crate::core::error::AppError;
use crate::core::result::{AppResult, ResultExt};
use crate::core::types::WalletAddress;
use crate::services::leaderboard::{Leaderboard, TraderStanding};
use crate::services::FeeEngine;
use crate::utils::Command;
use crate::bail_validation;

/// Main application state and coordinator
#[derive(Debug, Clone)]
pub struct Application {
    /// Application configuration
    config: Arc<AppConfig>,

    /// Engine built from the configured tables
    engine: Arc<FeeEngine>,

    /// Start timestamp
    started_at: chrono::DateTime<chrono::Utc>,
}

impl Application {
    /// Build a new application instance with the given configuration
    #[instrument(skip(config))]
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        info!("🏗️  Building application instance");

        let validation_result = config.validate()?;
        if !validation_result.is_valid {
            return Err(AppError::config(format!(
                "Configuration validation failed: {:?}",
                validation_result.errors
            )));
        }

        for warning in &validation_result.warnings {
            warn!("⚠️  Configuration warning: {}", warning);
        }

        let engine = FeeEngine::from_config(&config)?;

        info!("✅ Application instance built successfully");
        Ok(Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            started_at: chrono::Utc::now(),
        })
    }

    /// Run one command and return its result document
    #[instrument(skip(self))]
    pub async fn execute(&self, command: &Command) -> AppResult<Value> {
        match self.run_command(command).await {
            Ok(output) => {
                debug!("Command completed");
                Ok(output)
            }
            Err(e) => {
                let context = e.to_context("application");
                warn!(severity = ?context.severity, metadata = ?context.metadata, "Command failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_command(&self, command: &Command) -> AppResult<Value> {
        let engine = &self.engine;

        let output = match command {
            Command::Fee { holdings, ape, promo } => {
                let decision = engine.calculate_fee_bps(*holdings, *ape, *promo);
                json!({
                    "fee_bps": decision.fee_bps,
                    "fee_percent": decision.as_percent(),
                    "discount_pct": engine.discount_pct(decision.fee_bps),
                })
            }
            Command::Tier { holdings } => serde_json::to_value(engine.current_tier(*holdings))?,
            Command::Milestone { rank, volume, trades, fees } => {
                let result = engine.check_milestone_eligibility(*rank, *volume, *trades, *fees);
                serde_json::to_value(result)?
            }
            Command::Referral { fee, volume } => serde_json::to_value(engine.compute_referral_split(*fee, *volume))?,
            Command::Settle { volume, holdings, ape, promo, referred } => {
                let decision = engine.calculate_fee_bps(*holdings, *ape, *promo);
                serde_json::to_value(engine.settle_trade(*volume, decision.fee_bps, *referred))?
            }
            Command::ReferralCode { wallet } => {
                let wallet = WalletAddress::from_str(wallet)?;
                json!({
                    "wallet": wallet.as_str(),
                    "referral_code": engine.referral_code(&wallet),
                })
            }
            Command::Tiers => {
                let schedule = engine.fee_schedule();
                let tiers: Vec<Value> = schedule
                    .tiers()
                    .iter()
                    .map(|tier| {
                        json!({
                            "min_holdings_usd": tier.min_holdings_usd,
                            "fee_bps": tier.fee_bps,
                            "discount_label": tier.discount_label,
                            "discount_pct": schedule.discount_pct(tier.fee_bps),
                        })
                    })
                    .collect();
                json!({
                    "ape_mode_multiplier": schedule.ape_mode_multiplier(),
                    "promotional_fee_bps": schedule.promotional_fee_bps(),
                    "tiers": tiers,
                })
            }
            Command::Leaderboard { input, limit } => {
                if *limit == Some(0) {
                    bail_validation!("--limit must be at least 1");
                }
                let standings = read_standings(input).await?;
                let board = match limit {
                    Some(limit) => Leaderboard::rank(standings, *limit),
                    None => engine.leaderboard(standings),
                };
                serde_json::to_value(board.entries())?
            }
        };

        Ok(output)
    }

    /// Get application configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Engine shared by all commands
    pub fn engine(&self) -> Arc<FeeEngine> {
        Arc::clone(&self.engine)
    }

    /// Get application uptime
    pub fn get_uptime(&self) -> chrono::Duration {
        chrono::Utc::now() - self.started_at
    }
}

async fn read_standings(path: &Path) -> AppResult<Vec<TraderStanding>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_config_err(|| format!("Failed to read standings file {}", path.display()))?;

    let standings: Vec<TraderStanding> = serde_json::from_str(&content)
        .map_validation_err("input", || format!("Malformed standings in {}", path.display()))?;
    debug!(count = standings.len(), "loaded trader standings");
    Ok(standings)
}
