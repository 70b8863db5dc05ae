//! Error types for price resolution

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValuationError>;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("history error: {0}")]
    History(#[from] history_store::HistoryError),

    #[error("feed error: {0}")]
    Feed(#[from] fpl_fetcher::FeedError),
}

impl ValuationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ValuationError::Feed(e) => e.is_retryable(),
            ValuationError::History(_) => false,
        }
    }
}
