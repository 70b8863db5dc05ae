//! Data-feed collaborator for the squad engine
//!
//! Everything here is fetch-only: the bulk player pool (current price
//! and position per player), per-participant per-gameweek picks, and
//! per-player price history. The feed is eventually consistent and
//! rate limited; failures surface as a retryable error class distinct
//! from domain errors.
//!
//! The [`PlayerFeed`] trait is the seam: [`FplClient`] talks to the
//! live HTTP API with an explicit [`FeedConfig`] handed over at
//! construction time, [`StaticFeed`] serves fixture data for tests and
//! offline runs.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod static_feed;

pub use config::FeedConfig;
pub use error::{FeedError, FeedResult};
pub use fetcher::{FplClient, PlayerFeed};
pub use models::{FeedPlayer, GameweekPicks, Pick, PricePoint};
pub use static_feed::StaticFeed;
