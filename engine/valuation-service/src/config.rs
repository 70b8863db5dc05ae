//! Resolver configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Concurrent picks fetches during fallback reconstruction. The
    /// feed is rate limited; keep this small.
    pub max_concurrent_fetches: usize,

    /// Cache resolved purchase prices per (participant, player,
    /// as-of-gameweek).
    pub cache_enabled: bool,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self { max_concurrent_fetches: 4, cache_enabled: true }
    }
}
