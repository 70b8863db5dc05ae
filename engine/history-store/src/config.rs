//! History store configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the local file backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Root directory for history data.
    pub data_dir: PathBuf,

    /// Pretty-print snapshot and ledger JSON (handy in development,
    /// larger files).
    pub pretty_json: bool,
}

impl HistoryConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), pretty_json: false }
    }

    /// Directory holding one subdirectory per participant.
    pub fn participants_dir(&self) -> PathBuf {
        self.data_dir.join("participants")
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::new(Path::new("./data/history"))
    }
}
