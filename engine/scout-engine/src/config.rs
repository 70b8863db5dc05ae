//! Heuristic tuning knobs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Alternatives offered per replacement candidate.
    pub max_alternatives: usize,

    /// How many of the weakest owned players per position to consider.
    pub weak_per_position: usize,

    /// Half-width of the "similar" price band, in tenths (5 = ±0.5
    /// currency units).
    pub similar_band_tenths: i64,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self { max_alternatives: 5, weak_per_position: 3, similar_band_tenths: 5 }
    }
}
