//! Configuration management module
//!
//! Loads the fee, milestone and reward tables from a TOML file,
//! environment variables, command-line flags and YAML profiles, and
//! validates them before the engine is built.

pub mod loader;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use loader::{ConfigLoader, load_config, load_config_with_args, load_config_from_path};
pub use models::{
    AppConfig, EnvironmentConfig, FeesConfig, MilestonesConfig, ProfileConfig, ReferralsConfig, RewardsConfig,
};
pub use validation::{ConfigValidator, ValidationResult};

// Re-export CLI args from utils for convenience
pub use crate::utils::CliArgs;
