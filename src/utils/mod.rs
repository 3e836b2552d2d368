//! Utility functions and helpers used throughout the application
//!
//! Logging setup, command-line parsing and input validation.

pub mod validation;

// Re-export commonly used utilities
pub use validation::*;

/// Telemetry and observability utilities
pub mod telemetry {
    use anyhow::{anyhow, Result};
    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
    };

    /// Initialize global tracing with the specified log level and format
    ///
    /// Logs go to stderr so command output on stdout stays machine-readable.
    pub fn init(log_level: &str, log_format: &str) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level));

        let registry = Registry::default().with(env_filter);

        let installed = match log_format {
            "json" => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init(),
            "compact" => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_thread_ids(false),
                )
                .try_init(),
            _ => registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init(),
        };

        installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
    }

    /// Initialize file-based logging with daily rotation
    ///
    /// The returned guard flushes the background writer; keep it alive for
    /// the life of the process.
    pub fn init_with_file_rotation(
        log_level: &str,
        log_format: &str,
        log_directory: &str,
        file_name_prefix: &str,
    ) -> Result<WorkerGuard> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level));

        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            log_directory,
            file_name_prefix,
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let registry = Registry::default().with(env_filter);

        let installed = match log_format {
            "json" => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(fmt::layer().compact().with_writer(std::io::stderr).with_target(false))
                .try_init(),
            _ => registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .with(fmt::layer().compact().with_writer(std::io::stderr).with_target(false))
                .try_init(),
        };

        installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;
        Ok(guard)
    }
}

/// Command-line argument parsing
pub mod cli {
    use clap::{Parser, Subcommand};
    use rust_decimal::Decimal;
    use std::path::PathBuf;

    /// Command line arguments for the application
    #[derive(Parser, Debug, Clone)]
    #[command(
        name = "shx-fees",
        about = "Holder fee tiers, milestone rewards and referral splits for SHX swaps",
        version = env!("CARGO_PKG_VERSION"),
        author = "Hassan Hafedh Ubaid"
    )]
    pub struct CliArgs {
        /// Path to configuration file
        #[arg(short, long, global = true, env = "SHX_CONFIG_PATH")]
        pub config_path: Option<String>,

        /// Logging level (trace, debug, info, warn, error)
        #[arg(short, long, global = true)]
        pub log_level: Option<String>,

        /// Log format (json, pretty, compact)
        #[arg(long, global = true)]
        pub log_format: Option<String>,

        /// Environment (development, staging, production)
        #[arg(short, long, global = true)]
        pub environment: Option<String>,

        /// Override profile from configs/profiles/<name>.yaml
        #[arg(short, long, global = true, env = "SHX_PROFILE")]
        pub profile: Option<String>,

        /// What to calculate
        #[command(subcommand)]
        pub command: Command,
    }

    /// Calculator subcommands, each printing one JSON document
    #[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
    pub enum Command {
        /// Fee in basis points for one swap
        Fee {
            /// Reference-token holdings (USD)
            #[arg(long, allow_hyphen_values = true)]
            holdings: Decimal,
            /// Ape Mode is on
            #[arg(long)]
            ape: bool,
            /// Swap is promotional
            #[arg(long)]
            promo: bool,
        },
        /// Current tier and progress to the next one
        Tier {
            /// Reference-token holdings (USD)
            #[arg(long, allow_hyphen_values = true)]
            holdings: Decimal,
        },
        /// Milestone eligibility for a ranked trader
        Milestone {
            /// Leaderboard rank (1 is best)
            #[arg(long, allow_negative_numbers = true)]
            rank: i64,
            /// Volume in the period (USD)
            #[arg(long)]
            volume: Decimal,
            /// Trades in the period
            #[arg(long)]
            trades: u32,
            /// Fees paid in the period (USD)
            #[arg(long)]
            fees: Decimal,
        },
        /// Referrer credit for one referred trade
        Referral {
            /// Fee paid by the referred trader (USD)
            #[arg(long)]
            fee: Decimal,
            /// Volume of the referred trade (USD)
            #[arg(long)]
            volume: Decimal,
        },
        /// Fee, XP and referral credit for a completed swap
        Settle {
            /// Swap volume (USD)
            #[arg(long)]
            volume: Decimal,
            /// Reference-token holdings (USD)
            #[arg(long, allow_hyphen_values = true)]
            holdings: Decimal,
            /// Ape Mode is on
            #[arg(long)]
            ape: bool,
            /// Swap is promotional
            #[arg(long)]
            promo: bool,
            /// Trader was referred
            #[arg(long)]
            referred: bool,
        },
        /// Referral code for a wallet
        ReferralCode {
            /// Solana wallet address
            #[arg(long)]
            wallet: String,
        },
        /// Configured fee tier table
        Tiers,
        /// Rank traders from a JSON file of standings
        Leaderboard {
            /// JSON array of trader standings
            #[arg(long)]
            input: PathBuf,
            /// Entries to keep (defaults to the configured leaderboard size)
            #[arg(long)]
            limit: Option<usize>,
        },
    }
}

// Re-export CLI utilities
pub use cli::{CliArgs, Command};

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clap::Parser;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from([
            "shx-fees", "--log-level", "debug", "fee", "--holdings", "20000", "--ape",
        ])
        .unwrap();

        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(
            args.command,
            Command::Fee { holdings: dec!(20000), ape: true, promo: false }
        );
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "shx-fees", "tier", "--holdings", "7500.50", "--profile", "launch", "--log-format", "json",
        ])
        .unwrap();

        assert_eq!(args.profile.as_deref(), Some("launch"));
        assert_eq!(args.log_format.as_deref(), Some("json"));
        assert_eq!(args.command, Command::Tier { holdings: dec!(7500.50) });
    }

    #[test]
    fn test_milestone_and_leaderboard_parsing() {
        let args = CliArgs::try_parse_from([
            "shx-fees", "milestone", "--rank", "3", "--volume", "150000", "--trades", "12", "--fees", "40",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Milestone { rank: 3, volume: dec!(150000), trades: 12, fees: dec!(40) }
        );

        let args = CliArgs::try_parse_from([
            "shx-fees", "milestone", "--rank", "-1", "--volume", "0", "--trades", "0", "--fees", "0",
        ])
        .unwrap();
        assert_matches!(args.command, Command::Milestone { rank: -1, .. });

        let args = CliArgs::try_parse_from(["shx-fees", "leaderboard", "--input", "standings.json"]).unwrap();
        assert_eq!(
            args.command,
            Command::Leaderboard { input: "standings.json".into(), limit: None }
        );
    }

    #[test]
    fn test_file_rotation_logging_installs() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = dir.path().to_string_lossy().into_owned();

        // Only one global subscriber can be installed per process
        match telemetry::init_with_file_rotation("info", "json", &log_dir, "shx-fees.log") {
            Ok(guard) => drop(guard),
            Err(e) => assert!(e.to_string().contains("tracing subscriber")),
        }
        assert!(telemetry::init_with_file_rotation("info", "pretty", &log_dir, "shx-fees.log").is_err());
    }

    #[test]
    fn test_rejects_bad_amount() {
        assert!(CliArgs::try_parse_from(["shx-fees", "fee", "--holdings", "lots"]).is_err());
        assert!(CliArgs::try_parse_from(["shx-fees"]).is_err());
    }
}
