//! The operation facade over the engine components

use crate::config::ServiceConfig;
use anyhow::{Context, Result};
use fpl_fetcher::{FplClient, PlayerFeed, StaticFeed};
use history_store::{HistoryBackend, InMemoryHistory, LocalHistory, SquadSnapshot, TransferRecord};
use scout_engine::{Recommendation, ScoutConfig, ScoutEngine};
use squad_core::{ChipInstanceId, Gameweek, ParticipantId, PlayerId, Squad};
use squad_service::{SquadService, TransferSummary};
use std::sync::Arc;
use tracing::info;
use valuation_service::{PriceResolver, ResolvedPrice, ValuationConfig};

/// SquadManager exposes the full operation set to calling
/// collaborators. Identity arrives as a plain [`ParticipantId`];
/// authentication and transport live outside this crate.
pub struct SquadManager {
    squads: SquadService,
    resolver: PriceResolver,
    scout: ScoutEngine,
    feed: Arc<dyn PlayerFeed>,
}

impl SquadManager {
    /// Build the manager from configuration, choosing the live or
    /// fixture feed and the local-file or in-memory history backend.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let feed: Arc<dyn PlayerFeed> = if config.feed.use_static_data {
            info!("using static fixture feed");
            Arc::new(StaticFeed::new())
        } else {
            Arc::new(FplClient::new(config.feed.clone()).context("failed to build feed client")?)
        };
        let history: Arc<dyn HistoryBackend> = if config.service.use_local_history {
            Arc::new(
                LocalHistory::new(config.history.clone())
                    .context("failed to open local history")?,
            )
        } else {
            Arc::new(InMemoryHistory::new())
        };
        Ok(Self::new(history, feed, config.valuation.clone(), config.scout.clone()))
    }

    /// Build the manager from explicit components.
    pub fn new(
        history: Arc<dyn HistoryBackend>,
        feed: Arc<dyn PlayerFeed>,
        valuation: ValuationConfig,
        scout: ScoutConfig,
    ) -> Self {
        Self {
            squads: SquadService::new(Arc::clone(&history), Arc::clone(&feed)),
            resolver: PriceResolver::new(history, Arc::clone(&feed), valuation),
            scout: ScoutEngine::new(scout),
            feed,
        }
    }

    pub async fn initialize_squad(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> Result<Squad> {
        Ok(self.squads.initialize_squad(participant, gameweek).await?)
    }

    pub async fn get_squad(&self, participant: ParticipantId) -> Result<Squad> {
        Ok(self.squads.squad(participant).await?)
    }

    pub async fn advance_gameweek(
        &self,
        participant: ParticipantId,
        new_gameweek: Gameweek,
        points_scored: i32,
    ) -> Result<Squad> {
        Ok(self.squads.advance_gameweek(participant, new_gameweek, points_scored).await?)
    }

    pub async fn make_transfer(
        &self,
        participant: ParticipantId,
        player_out: PlayerId,
        player_in: PlayerId,
        gameweek: Gameweek,
    ) -> Result<TransferRecord> {
        Ok(self.squads.make_transfer(participant, player_out, player_in, gameweek).await?)
    }

    pub async fn get_history_snapshot(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> Result<SquadSnapshot> {
        Ok(self.squads.history_snapshot(participant, gameweek).await?)
    }

    pub async fn list_history(&self, participant: ParticipantId) -> Result<Vec<SquadSnapshot>> {
        Ok(self.squads.list_history(participant).await?)
    }

    pub async fn get_transfer_history(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<TransferRecord>> {
        Ok(self.squads.transfer_history(participant).await?)
    }

    pub async fn get_transfer_summary(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> Result<TransferSummary> {
        Ok(self.squads.transfer_summary(participant, gameweek).await?)
    }

    pub async fn list_available_chips(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> Result<Vec<ChipInstanceId>> {
        Ok(self.squads.available_chips(participant, gameweek).await?)
    }

    pub async fn activate_chip(
        &self,
        participant: ParticipantId,
        chip: ChipInstanceId,
        gameweek: Gameweek,
    ) -> Result<Squad> {
        Ok(self.squads.activate_chip(participant, chip, gameweek).await?)
    }

    pub async fn cancel_chip(&self, participant: ParticipantId) -> Result<Squad> {
        Ok(self.squads.cancel_chip(participant).await?)
    }

    /// What a participant paid for a player as of a gameweek, from
    /// snapshot history or reconstructed from the feed.
    pub async fn resolve_purchase_price(
        &self,
        participant: ParticipantId,
        player_id: PlayerId,
        as_of_gameweek: Gameweek,
    ) -> Result<Option<ResolvedPrice>> {
        Ok(self.resolver.resolve_purchase_price(participant, player_id, as_of_gameweek).await?)
    }

    /// Replacement suggestions for the weakest owned players over the
    /// forecast window.
    pub async fn recommend_transfers(
        &self,
        participant: ParticipantId,
        from: Gameweek,
        until: Gameweek,
    ) -> Result<Vec<Recommendation>> {
        let squad = self.squads.squad(participant).await?;
        let pool = self.feed.player_pool().await?;
        Ok(self.scout.recommend(&squad, &pool, from, until))
    }

    pub async fn health_check(&self) -> Result<()> {
        self.feed.health_check().await.context("feed unreachable")
    }
}
