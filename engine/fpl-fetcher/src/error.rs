//! Feed error types

use squad_core::{Gameweek, ParticipantId, PlayerId};
use thiserror::Error;

pub type FeedResult<T> = std::result::Result<T, FeedError>;

/// Failures talking to the external data feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("feed has no player {player_id}")]
    UnknownPlayer { player_id: PlayerId },

    #[error("feed has no picks for participant {participant} gameweek {gameweek}")]
    PicksUnavailable { participant: ParticipantId, gameweek: Gameweek },
}

impl FeedError {
    /// Transport-level failures are worth retrying; missing data is
    /// not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FeedError::Http(_) | FeedError::Status { .. })
    }
}
