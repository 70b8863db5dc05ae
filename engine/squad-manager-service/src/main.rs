//! Squad Manager Service
//!
//! Entry point for the squad economy engine: loads configuration,
//! initializes logging, wires the components and runs until a
//! shutdown signal arrives.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use squad_manager_service::{initialize_logging_with_config, load_configuration, SquadManager};

#[derive(Parser)]
#[command(name = "squad-manager", version, about = "Fantasy squad economy service")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    initialize_logging_with_config(&config.logging)?;

    info!("starting squad manager v{}", env!("CARGO_PKG_VERSION"));
    let manager =
        Arc::new(SquadManager::from_config(&config).context("failed to build squad manager")?);

    match manager.health_check().await {
        Ok(()) => info!("data feed reachable"),
        Err(e) => warn!(error = %e, "data feed health check failed at startup"),
    }

    info!("squad manager running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("shutdown signal received, stopping");
    Ok(())
}
