//! Configuration loader with multi-source support
//!
//! Sources are applied in order, later ones winning:
//! TOML base file, `SHX_`-prefixed environment variables, command-line
//! arguments, the selected YAML profile, then any additional files.

use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::bail_config;
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::utils::CliArgs;
use super::models::{AppConfig, ProfileConfig};

/// Configuration loader with support for multiple sources
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base configuration path
    config_path: Option<PathBuf>,

    /// CLI arguments
    cli_args: Option<CliArgs>,

    /// Environment prefix for variables
    env_prefix: String,

    /// Enable environment variable loading
    enable_env: bool,

    /// Directory searched for `<profile>.yaml`
    profile_dir: Option<PathBuf>,

    /// Additional configuration files
    additional_files: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            config_path: None,
            cli_args: None,
            env_prefix: "SHX".to_string(),
            enable_env: true,
            profile_dir: None,
            additional_files: Vec::new(),
        }
    }

    /// Set the base configuration path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set CLI arguments
    pub fn with_cli_args(mut self, args: CliArgs) -> Self {
        self.cli_args = Some(args);
        self
    }

    /// Set environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Disable environment variable loading
    pub fn without_env(mut self) -> Self {
        self.enable_env = false;
        self
    }

    /// Search this directory for profile files instead of the defaults
    pub fn with_profile_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.profile_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add an additional configuration file
    pub fn with_additional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.additional_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load and build the complete application configuration
    #[instrument(skip(self))]
    pub async fn load(self) -> AppResult<AppConfig> {
        info!("🔧 Starting configuration loading process");

        // Step 1: Load base configuration from TOML
        let mut config = self.load_base_config()
            .await
            .context("Failed to load base configuration")?;

        // Step 2: Apply environment variable overrides
        let env_config = if self.enable_env {
            let env_config = self.environment_source()?;
            self.apply_environment_overrides(&mut config, &env_config)
                .context("Failed to apply environment overrides")?;
            Some(env_config)
        } else {
            None
        };

        // Step 3: Apply CLI argument overrides
        if let Some(ref cli_args) = self.cli_args {
            self.apply_cli_overrides(&mut config, cli_args);
        }

        // Step 4: Load and apply the selected profile
        if let Some(name) = self.profile_name(env_config.as_ref()) {
            let profile = self.load_profile(&name).await?;
            config.apply_profile_overrides(profile)?;
        }

        // Step 5: Apply additional configuration files
        for file_path in &self.additional_files {
            self.apply_additional_config(&mut config, file_path)
                .await
                .map_err(|e| AppError::config(format!("Failed to apply additional config from {:?}", file_path)).with_source(e))?;
        }

        info!("✅ Configuration loading completed successfully");
        debug!(
            "📊 Final configuration: environment={}, tiers={}, profile={:?}",
            config.environment.name,
            config.fees.tiers.len(),
            config.profile.as_ref().map(|p| p.name.as_str())
        );

        Ok(config)
    }

    /// Load base configuration from TOML file
    async fn load_base_config(&self) -> Result<AppConfig> {
        let config_path = self.resolve_config_path();

        info!("📄 Loading base configuration from: {}", config_path.display());

        if !config_path.exists() {
            warn!("⚠️  Configuration file not found: {}", config_path.display());
            warn!("⚠️  Using default configuration values");
            return Ok(AppConfig::default());
        }

        let config_content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: AppConfig = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse TOML config: {}", config_path.display()))?;

        debug!("✅ Base configuration loaded successfully");
        Ok(config)
    }

    /// Resolve the configuration file path
    fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref path) = self.config_path {
            return path.clone();
        }

        if let Some(path) = self.cli_args.as_ref().and_then(|a| a.config_path.as_ref()) {
            return PathBuf::from(path);
        }

        if self.enable_env {
            if let Ok(path) = env::var(format!("{}_CONFIG_PATH", self.env_prefix)) {
                return PathBuf::from(path);
            }
        }

        let default_paths = [
            "configs/config.toml",
            "config.toml",
            "/etc/shx-fees/config.toml",
        ];

        for path in &default_paths {
            let pb = PathBuf::from(path);
            if pb.exists() {
                debug!("📍 Found config file at: {}", pb.display());
                return pb;
            }
        }

        // Return default path even if it doesn't exist
        PathBuf::from("configs/config.toml")
    }

    /// Environment variables as a `config` source
    ///
    /// `SHX_FEES__APE_MODE_MULTIPLIER=2` becomes the key `fees.ape_mode_multiplier`.
    fn environment_source(&self) -> AppResult<Config> {
        let env_config = Config::builder()
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .ignore_empty(true),
            )
            .build()?;
        Ok(env_config)
    }

    /// Apply environment variable overrides
    fn apply_environment_overrides(&self, config: &mut AppConfig, env_config: &Config) -> Result<()> {
        debug!("🌍 Applying environment variable overrides");

        self.apply_env_var(config, env_config, "environment.name", |cfg, val: String| {
            cfg.environment.name = val;
        })?;
        self.apply_env_var(config, env_config, "environment.log_level", |cfg, val: String| {
            cfg.environment.log_level = val;
        })?;
        self.apply_env_var(config, env_config, "environment.log_format", |cfg, val: String| {
            cfg.environment.log_format = val;
        })?;
        self.apply_env_var(config, env_config, "environment.debug_mode", |cfg, val: bool| {
            cfg.environment.debug_mode = val;
        })?;
        self.apply_env_var(config, env_config, "environment.log_directory", |cfg, val: String| {
            cfg.environment.log_directory = Some(val);
        })?;

        self.apply_env_var(config, env_config, "fees.ape_mode_multiplier", |cfg, val: Decimal| {
            cfg.fees.ape_mode_multiplier = val;
        })?;
        self.apply_env_var(config, env_config, "fees.promotional_fee_bps", |cfg, val: u32| {
            cfg.fees.promotional_fee_bps = val;
        })?;

        self.apply_env_var(config, env_config, "milestones.top_rank", |cfg, val: u32| {
            cfg.milestones.top_rank = val;
        })?;
        self.apply_env_var(config, env_config, "milestones.min_trade_count", |cfg, val: u32| {
            cfg.milestones.min_trade_count = val;
        })?;
        self.apply_env_var(config, env_config, "milestones.min_fees_paid_usd", |cfg, val: Decimal| {
            cfg.milestones.min_fees_paid_usd = val;
        })?;

        self.apply_env_var(config, env_config, "rewards.trader_xp_per_usd", |cfg, val: Decimal| {
            cfg.rewards.trader_xp_per_usd = val;
        })?;
        self.apply_env_var(config, env_config, "rewards.referral_fee_share", |cfg, val: Decimal| {
            cfg.rewards.referral_fee_share = val;
        })?;
        self.apply_env_var(config, env_config, "rewards.referral_xp_per_usd", |cfg, val: Decimal| {
            cfg.rewards.referral_xp_per_usd = val;
        })?;

        self.apply_env_var(config, env_config, "referrals.code_prefix", |cfg, val: String| {
            cfg.referrals.code_prefix = val;
        })?;
        self.apply_env_var(config, env_config, "referrals.leaderboard_size", |cfg, val: usize| {
            cfg.referrals.leaderboard_size = val;
        })?;

        debug!("✅ Environment variable overrides applied");
        Ok(())
    }

    /// Apply a single environment variable with type conversion
    fn apply_env_var<T, F>(&self, config: &mut AppConfig, env_config: &Config, key: &str, applier: F) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnOnce(&mut AppConfig, T),
    {
        match env_config.get::<T>(key) {
            Ok(value) => {
                applier(config, value);
                debug!("🔄 Applied environment override: {}", key);
                Ok(())
            }
            Err(ConfigError::NotFound(_)) => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Invalid value for {} environment override", key)),
        }
    }

    /// Apply CLI argument overrides
    fn apply_cli_overrides(&self, config: &mut AppConfig, cli_args: &CliArgs) {
        debug!("⌨️  Applying CLI argument overrides");

        if let Some(ref env_name) = cli_args.environment {
            config.environment.name = env_name.clone();
        }
        if let Some(ref level) = cli_args.log_level {
            config.environment.log_level = level.clone();
        }
        if let Some(ref format) = cli_args.log_format {
            config.environment.log_format = format.clone();
        }
    }

    /// Profile requested on the command line, then via `SHX_PROFILE`
    fn profile_name(&self, env_config: Option<&Config>) -> Option<String> {
        self.cli_args
            .as_ref()
            .and_then(|a| a.profile.clone())
            .or_else(|| env_config.and_then(|c| c.get_string("profile").ok()))
    }

    /// Locate and load a named profile
    async fn load_profile(&self, name: &str) -> AppResult<ProfileConfig> {
        let candidates = match self.profile_dir {
            Some(ref dir) => vec![dir.join(format!("{}.yaml", name)), dir.join(format!("{}.yml", name))],
            None => vec![
                PathBuf::from(format!("configs/profiles/{}.yaml", name)),
                PathBuf::from(format!("profiles/{}.yaml", name)),
            ],
        };

        for path in &candidates {
            if path.exists() {
                info!("📋 Loading profile configuration: {}", path.display());
                return self.load_profile_from_path(path).await;
            }
        }

        bail_config!("Profile '{}' not found (looked in {:?})", name, candidates)
    }

    /// Load profile configuration from a specific path
    async fn load_profile_from_path(&self, path: &Path) -> AppResult<ProfileConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::config(format!("Failed to read profile file {}: {}", path.display(), e)))?;

        let profile: ProfileConfig = serde_yaml::from_str(&content)
            .map_err(|e| AppError::config(format!("Failed to parse profile YAML {}: {}", path.display(), e)))?;

        debug!("✅ Profile configuration loaded: {}", profile.name);
        Ok(profile)
    }

    /// Apply additional configuration file
    ///
    /// TOML files are read as `[section] field = value` overrides, YAML files
    /// as profiles.
    async fn apply_additional_config(&self, config: &mut AppConfig, file_path: &Path) -> AppResult<()> {
        if !file_path.exists() {
            warn!("⚠️  Additional config file not found: {}", file_path.display());
            return Ok(());
        }

        info!("📄 Applying additional configuration: {}", file_path.display());

        let file_extension = file_path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        let content = tokio::fs::read_to_string(file_path).await?;

        match file_extension {
            "toml" => {
                let table: toml::Table = toml::from_str(&content)?;
                for (section, fields) in table {
                    let Some(fields) = fields.as_table() else {
                        warn!("Ignoring top-level key '{}' in {}", section, file_path.display());
                        continue;
                    };
                    for (field, value) in fields {
                        let value = serde_yaml::to_value(value)?;
                        config.apply_override(&format!("{}.{}", section, field), value)?;
                    }
                }
            }
            "yaml" | "yml" => {
                let profile: ProfileConfig = serde_yaml::from_str(&content)?;
                config.apply_profile_overrides(profile)?;
            }
            _ => {
                warn!("⚠️  Unsupported config file format: {}", file_extension);
            }
        }

        debug!("✅ Additional configuration applied");
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to load configuration with default settings
pub async fn load_config() -> AppResult<AppConfig> {
    ConfigLoader::new().load().await
}

/// Load configuration with CLI arguments
pub async fn load_config_with_args(cli_args: CliArgs) -> AppResult<AppConfig> {
    ConfigLoader::new()
        .with_cli_args(cli_args)
        .load()
        .await
}

/// Load configuration from a specific path
pub async fn load_config_from_path<P: AsRef<Path>>(path: P) -> AppResult<AppConfig> {
    ConfigLoader::new()
        .with_config_path(path)
        .load()
        .await
}
