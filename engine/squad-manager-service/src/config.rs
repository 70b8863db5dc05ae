//! Service configuration management

use anyhow::{Context, Result};
use fpl_fetcher::FeedConfig;
use history_store::HistoryConfig;
use scout_engine::ScoutConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use valuation_service::ValuationConfig;

/// Main service configuration, aggregating every component's config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub service: ServiceSettings,
    pub logging: LoggingConfig,
    pub history: HistoryConfig,
    pub feed: FeedConfig,
    pub valuation: ValuationConfig,
    pub scout: ScoutConfig,
}

/// Service-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Persist history to local JSON files instead of keeping it in
    /// memory only.
    pub use_local_history: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { use_local_history: true }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Log format (json, pretty).
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Load configuration from an optional TOML file, then apply
/// `SQUAD_`-prefixed environment overrides (`SQUAD_LOGGING__LEVEL`,
/// `SQUAD_FEED__BASE_URL`, ...).
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let sources = builder
        .add_source(config::Environment::with_prefix("SQUAD").separator("__"))
        .build()
        .context("failed to read configuration sources")?;
    let service_config: ServiceConfig =
        sources.try_deserialize().context("invalid configuration")?;
    validate_config(&service_config)?;
    Ok(service_config)
}

fn validate_config(config: &ServiceConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => anyhow::bail!("invalid log level: {other}"),
    }
    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        other => anyhow::bail!("invalid log format: {other}"),
    }
    config.feed.validate().map_err(|e| anyhow::anyhow!("feed config: {e}"))?;
    config.history.validate().map_err(|e| anyhow::anyhow!("history config: {e}"))?;
    Ok(())
}
