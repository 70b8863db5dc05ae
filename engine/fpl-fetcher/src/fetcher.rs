//! The feed trait and the live HTTP client

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::models::{
    FeedPlayer, GameweekPicks, PricePoint, RawBootstrap, RawElementSummary, RawPicksResponse,
};
use reqwest::Client;
use squad_core::{Gameweek, ParticipantId, PlayerId};
use std::time::Duration;
use tracing::{debug, info};

/// Read-only access to the external player/picks/price feed.
#[async_trait::async_trait]
pub trait PlayerFeed: Send + Sync {
    /// The full player pool with current prices and positions.
    async fn player_pool(&self) -> FeedResult<Vec<FeedPlayer>>;

    /// One player from the pool.
    async fn player(&self, player_id: PlayerId) -> FeedResult<FeedPlayer> {
        self.player_pool()
            .await?
            .into_iter()
            .find(|p| p.id == player_id)
            .ok_or(FeedError::UnknownPlayer { player_id })
    }

    /// A participant's picks for one gameweek.
    async fn picks(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> FeedResult<GameweekPicks>;

    /// Price-by-gameweek history for one player.
    async fn price_history(&self, player_id: PlayerId) -> FeedResult<Vec<PricePoint>>;

    /// Cheap reachability probe.
    async fn health_check(&self) -> FeedResult<()>;
}

/// Live feed client over HTTP.
pub struct FplClient {
    config: FeedConfig,
    client: Client,
}

impl FplClient {
    /// Build a client from an explicit configuration.
    pub fn new(config: FeedConfig) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> FeedResult<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        debug!(%url, "feed request");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status {
                status: response.status().as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl PlayerFeed for FplClient {
    async fn player_pool(&self) -> FeedResult<Vec<FeedPlayer>> {
        let bootstrap: RawBootstrap = self.get_json("bootstrap-static/").await?;
        let next_gameweek = bootstrap.next_gameweek();
        let pool: Vec<FeedPlayer> = bootstrap
            .elements
            .into_iter()
            .filter_map(|e| e.into_feed_player(next_gameweek))
            .collect();
        info!(players = pool.len(), "fetched player pool");
        Ok(pool)
    }

    async fn picks(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> FeedResult<GameweekPicks> {
        let endpoint = format!("entry/{}/event/{}/picks/", participant.0, gameweek);
        let raw: RawPicksResponse = match self.get_json(&endpoint).await {
            Ok(raw) => raw,
            Err(FeedError::Status { status: 404, .. }) => {
                return Err(FeedError::PicksUnavailable { participant, gameweek });
            }
            Err(e) => return Err(e),
        };
        Ok(raw.into_picks(participant, gameweek))
    }

    async fn price_history(&self, player_id: PlayerId) -> FeedResult<Vec<PricePoint>> {
        let endpoint = format!("element-summary/{}/", player_id.0);
        let raw: RawElementSummary = match self.get_json(&endpoint).await {
            Ok(raw) => raw,
            Err(FeedError::Status { status: 404, .. }) => {
                return Err(FeedError::UnknownPlayer { player_id });
            }
            Err(e) => return Err(e),
        };
        Ok(raw.into_price_history())
    }

    async fn health_check(&self) -> FeedResult<()> {
        // The bootstrap endpoint is the cheapest thing the feed serves.
        let _: serde_json::Value = self.get_json("bootstrap-static/").await?;
        Ok(())
    }
}
