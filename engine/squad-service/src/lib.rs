//! Squad lifecycle service
//!
//! Owns the live per-participant state (squad plus chip registry) and
//! applies every mutation to it: initialization from the external
//! picks feed, gameweek rollover with the free-hit revert, single
//! player transfers, and chip activation/cancellation. Mutations run
//! under a per-participant lock; history writes are sequenced after
//! the squad mutation they describe.

pub mod error;
pub mod service;
pub mod transfer;

pub use error::{Result, SquadServiceError};
pub use service::SquadService;
pub use transfer::TransferSummary;
