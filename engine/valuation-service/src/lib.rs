//! Price Resolver
//!
//! Answers "what did this participant pay for this player, and when"
//! from two sources: the regular snapshot history (authoritative when
//! present) and, for participants without usable snapshots, a
//! reconstruction of ownership intervals from the external picks feed.
//! The reconstruction fans out per-gameweek fetches with bounded
//! concurrency and degrades per player when a gameweek cannot be
//! fetched.

pub mod config;
pub mod error;
pub mod resolver;

pub use config::ValuationConfig;
pub use error::{Result, ValuationError};
pub use resolver::{PriceResolver, ResolvedPrice};
