//! Recommendation output shapes

use serde::{Deserialize, Serialize};
use squad_core::{PlayerId, Position, Price};

/// Price band of an alternative relative to the outgoing player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBand {
    /// More than half a unit cheaper.
    Budget,
    /// Within half a unit either way.
    Similar,
    /// More than half a unit costlier.
    Premium,
}

/// One suggested replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub player_id: PlayerId,
    pub name: String,
    pub price: Price,
    pub predicted_points: f64,
    pub band: PriceBand,
}

/// One weak owned player and the replacements drawn for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub player_out: PlayerId,
    pub position: Position,
    /// 0 = weakest owned player at this position.
    pub rank: u8,
    pub predicted_points: f64,
    pub current_price: Price,
    pub alternatives: Vec<Alternative>,
}
