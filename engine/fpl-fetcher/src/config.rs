//! Feed client configuration
//!
//! Passed explicitly at client construction; the client never reads
//! ambient process state at call time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the feed API.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Serve fixture data instead of hitting the live feed.
    pub use_static_data: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fantasy.premierleague.com/api".to_string(),
            request_timeout_secs: 30,
            use_static_data: false,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be positive".to_string());
        }
        Ok(())
    }
}
