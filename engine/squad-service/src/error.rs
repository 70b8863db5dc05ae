//! Error types for squad operations
//!
//! Variants fall into the classes callers branch on: validation,
//! not-found, state conflict, economic rejection, and external
//! dependency failure. Only the external class is retryable.

use squad_core::{ChipKind, Gameweek, ParticipantId, Position, Price};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SquadServiceError>;

#[derive(Error, Debug)]
pub enum SquadServiceError {
    // --- validation ---
    #[error("gameweek {gameweek} is outside the season range")]
    GameweekOutOfRange { gameweek: Gameweek },

    #[error(transparent)]
    Squad(#[from] squad_core::SquadError),

    // --- not found ---
    #[error("no squad for participant {participant}")]
    SquadNotFound { participant: ParticipantId },

    #[error("no {kind} snapshot for participant {participant} in gameweek {gameweek}")]
    SnapshotNotFound { participant: ParticipantId, gameweek: Gameweek, kind: &'static str },

    // --- state conflict ---
    #[error("squad already initialized for participant {participant}")]
    SquadAlreadyExists { participant: ParticipantId },

    #[error("squad is in gameweek {actual}, request targeted gameweek {requested}")]
    WrongGameweek { actual: Gameweek, requested: Gameweek },

    #[error("chip {chip} is already active this gameweek")]
    ChipAlreadyActive { chip: ChipKind },

    #[error("no chip is active")]
    NoActiveChip,

    #[error("chip {chip} cannot be cancelled once activated")]
    ChipNotCancellable { chip: ChipKind },

    #[error("free hit used in gameweek {last_used}, next allowed from gameweek {allowed_from}")]
    FreeHitTooSoon { last_used: Gameweek, allowed_from: Gameweek },

    #[error(transparent)]
    Chip(#[from] squad_core::ChipError),

    // --- economic ---
    #[error("insufficient funds: short by {shortfall}")]
    InsufficientFunds { shortfall: Price },

    #[error("position mismatch: {outgoing} out, {incoming} in")]
    PositionMismatch { outgoing: Position, incoming: Position },

    // --- external dependency ---
    #[error("feed error: {0}")]
    Feed(#[from] fpl_fetcher::FeedError),

    #[error("history error: {0}")]
    History(#[from] history_store::HistoryError),
}

impl SquadServiceError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SquadServiceError::Feed(e) => e.is_retryable(),
            _ => false,
        }
    }
}
