//! Squad Manager Service Library
//!
//! Wires the engine components together behind one facade: the squad
//! lifecycle service, the purchase-price resolver, the recommendation
//! heuristic and the data feed. Identity is supplied by the caller;
//! this crate performs no authentication and exposes no transport.

use anyhow::{Context, Result};

pub mod config;
pub mod logging;
pub mod manager;

pub use config::{LoggingConfig, ServiceConfig, ServiceSettings};
pub use logging::{initialize_logging, initialize_logging_with_config};
pub use manager::SquadManager;

/// Load configuration from the optional file and environment overrides.
pub fn load_configuration(path: Option<&std::path::Path>) -> Result<ServiceConfig> {
    config::load_config(path).context("failed to load service configuration")
}
