//! SHX Fee Engine Library
//!
//! Fee tiers, Ape Mode pricing, volume milestone rewards and referral
//! credit for swaps on the SHX exchange.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │        Application::build / execute(Command) -> JSON        │
//! └─────────────────────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Services Layer                          │
//! │  ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌───────────┐         │
//! │  │  Fees   │ │Milestones│ │ Rewards │ │Leaderboard│         │
//! │  └─────────┘ └──────────┘ └─────────┘ └───────────┘         │
//! │                     FeeEngine facade                        │
//! └─────────────────────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────────────────────┐
//! │             Configuration  /  Utilities                     │
//! │   TOML + env + CLI + YAML profiles, telemetry, clap         │
//! └─────────────────────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Core Layer                             │
//! │        Errors, value types, domain constants, rounding      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every calculation is a pure function of its inputs and the configured
//! tables. Wallet balances, prices and persistence belong to the caller.
//!
//! # Usage
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use shx_fee_engine::FeeEngine;
//!
//! let engine = FeeEngine::default();
//!
//! assert_eq!(engine.calculate_fee_bps(dec!(20000), false, false).fee_bps, 18);
//! assert_eq!(engine.calculate_fee_bps(dec!(20000), true, false).fee_bps, 27);
//! assert_eq!(engine.calculate_fee_bps(dec!(20000), true, true).fee_bps, 0);
//!
//! let split = engine.compute_referral_split(dec!(10), dec!(100));
//! assert_eq!(split.bonus_xp, 20);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Core modules - Domain layer containing value types and rules
pub mod core;

// Application layer - Command execution
pub mod application;

// Configuration management - Multi-source configuration loading
pub mod config;

// Services layer - Fee, milestone and reward calculators
pub mod services;

// Utilities - Shared helper functions and tools
pub mod utils;

// Re-export commonly used types for convenience
pub use application::Application;
pub use config::{AppConfig, ConfigLoader};
pub use core::{
    error::AppError,
    result::AppResult,
    types::*,
};
pub use services::{FeeDecision, FeeEngine, FeeSchedule, FeeTier, MilestoneResult, ReferralSplit, TierView};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "shx-fee-engine");
        assert!(!DESCRIPTION.is_empty());
    }
}
