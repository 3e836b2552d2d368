//! shx-fees - fee tier, milestone and referral calculator
//!
//! Loads the fee tables, runs one calculation and prints the result as JSON
//! on stdout. Logs go to stderr (and to rolling files when
//! `environment.log_directory` is set).
//!
//! ```text
//! shx-fees fee --holdings 20000 --ape
//! shx-fees milestone --rank 3 --volume 150000 --trades 12 --fees 40
//! shx-fees --profile launch-week tiers
//! ```

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use shx_fee_engine::{
    application::Application,
    config::{AppConfig, CliArgs, ConfigLoader},
    utils::telemetry,
};
use std::process;
use tracing::{debug, error, info, instrument, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() {
    // Setup color-eyre for enhanced error reporting
    if let Err(e) = color_eyre::install() {
        eprintln!("Failed to install color-eyre: {}", e);
        process::exit(1);
    }

    if let Err(e) = run().await {
        error!("Fatal application error: {:#}", e);

        eprintln!("\n❌ shx-fees failed:");
        eprintln!("   {}", e);
        for cause in e.chain().skip(1) {
            eprintln!("   Caused by: {}", cause);
        }

        process::exit(1);
    }
}

/// Main application execution logic
async fn run() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli_args = CliArgs::parse();

    let config = ConfigLoader::new()
        .with_cli_args(cli_args.clone())
        .load()
        .await
        .wrap_err("Configuration loading failed")?;

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_telemetry(&config)?;

    log_configuration_summary(&config);

    let app = Application::build(config)
        .await
        .wrap_err("Application initialization failed")?;
    execute(&app, &cli_args).await
}

fn init_telemetry(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let env = &config.environment;
    match env.log_directory {
        Some(ref dir) => {
            let guard = telemetry::init_with_file_rotation(&env.log_level, &env.log_format, dir, "shx-fees.log")
                .map_err(|e| eyre!("Failed to initialize telemetry system: {e:#}"))?;
            Ok(Some(guard))
        }
        None => {
            telemetry::init(&env.log_level, &env.log_format)
                .map_err(|e| eyre!("Failed to initialize telemetry system: {e:#}"))?;
            Ok(None)
        }
    }
}

/// Log configuration summary for transparency
fn log_configuration_summary(config: &AppConfig) {
    debug!("📊 Configuration Summary:");
    debug!("   Environment: {}", config.environment());
    debug!("   Fee tiers: {}", config.fees.tiers.len());
    debug!("   Ape Mode multiplier: {}", config.fees.ape_mode_multiplier);
    debug!("   Promotional fee: {} bps", config.fees.promotional_fee_bps);
    debug!("   Milestones: {} (top {})", config.milestones.table.len(), config.milestones.top_rank);
    debug!("   Referral share: {}", config.rewards.referral_fee_share);

    if let Some(ref profile) = config.profile {
        info!("📋 Profile '{}' active: {}", profile.name, profile.description);
    }
    if config.is_production() && config.environment.debug_mode {
        warn!("⚠️  Debug mode enabled in production");
    }
}

#[instrument(skip_all, fields(command = ?cli_args.command))]
async fn execute(app: &Application, cli_args: &CliArgs) -> Result<()> {
    let output = app
        .execute(&cli_args.command)
        .await
        .wrap_err("Command failed")?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
