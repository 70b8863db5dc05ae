//! Transfer recommendation heuristic
//!
//! Read-only scouting over a forecast window: per position, the
//! weakest owned players by cumulative predicted points are paired
//! with strictly better replacements from the feed pool, drawn from
//! price bands around the outgoing player's price. A heuristic, not an
//! optimizer; the only promises are "never a same-or-lower scorer" and
//! "never a player already owned".

pub mod config;
pub mod models;
pub mod recommender;

pub use config::ScoutConfig;
pub use models::{Alternative, PriceBand, Recommendation};
pub use recommender::ScoutEngine;
