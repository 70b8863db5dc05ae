//! # History Store
//!
//! Append-only history for the squad engine: per-gameweek snapshots of
//! squad state (for audit and free-hit rollback) and the transfer
//! ledger. Storage sits behind the [`HistoryBackend`] trait with an
//! in-memory implementation and a local JSON-file implementation.
//!
//! Writes are sequenced by the caller after the squad mutation they
//! describe; this crate only guarantees that each write is atomic on
//! its own.

pub mod backend;
pub mod config;
pub mod error;
pub mod ledger;
pub mod snapshot;

pub use backend::{HistoryBackend, InMemoryHistory, LocalHistory};
pub use config::HistoryConfig;
pub use error::{HistoryError, Result};
pub use ledger::{TransferIn, TransferOut, TransferRecord};
pub use snapshot::{SnapshotKind, SquadSnapshot};
