//! In-memory fixture feed
//!
//! Stands in for the live feed in tests and offline runs. Fixture
//! data is loaded up front; individual picks lookups can be marked as
//! failing to exercise degradation paths downstream.

use crate::error::{FeedError, FeedResult};
use crate::fetcher::PlayerFeed;
use crate::models::{FeedPlayer, GameweekPicks, PricePoint};
use squad_core::{Gameweek, ParticipantId, PlayerId};
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct StaticFeed {
    players: HashMap<PlayerId, FeedPlayer>,
    picks: HashMap<(ParticipantId, Gameweek), GameweekPicks>,
    price_histories: HashMap<PlayerId, Vec<PricePoint>>,
    failing_picks: HashSet<(ParticipantId, Gameweek)>,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_player(&mut self, player: FeedPlayer) -> &mut Self {
        self.players.insert(player.id, player);
        self
    }

    pub fn set_picks(&mut self, picks: GameweekPicks) -> &mut Self {
        self.picks.insert((picks.participant_id, picks.gameweek), picks);
        self
    }

    pub fn set_price_history(&mut self, player_id: PlayerId, history: Vec<PricePoint>) -> &mut Self {
        self.price_histories.insert(player_id, history);
        self
    }

    /// Make one picks lookup fail with a transport error, simulating a
    /// feed outage for that gameweek.
    pub fn fail_picks(&mut self, participant: ParticipantId, gameweek: Gameweek) -> &mut Self {
        self.failing_picks.insert((participant, gameweek));
        self
    }
}

#[async_trait::async_trait]
impl PlayerFeed for StaticFeed {
    async fn player_pool(&self) -> FeedResult<Vec<FeedPlayer>> {
        let mut pool: Vec<FeedPlayer> = self.players.values().cloned().collect();
        pool.sort_by_key(|p| p.id);
        Ok(pool)
    }

    async fn player(&self, player_id: PlayerId) -> FeedResult<FeedPlayer> {
        self.players.get(&player_id).cloned().ok_or(FeedError::UnknownPlayer { player_id })
    }

    async fn picks(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> FeedResult<GameweekPicks> {
        if self.failing_picks.contains(&(participant, gameweek)) {
            return Err(FeedError::Status {
                status: 503,
                endpoint: format!("entry/{}/event/{}/picks/", participant.0, gameweek),
            });
        }
        self.picks
            .get(&(participant, gameweek))
            .cloned()
            .ok_or(FeedError::PicksUnavailable { participant, gameweek })
    }

    async fn price_history(&self, player_id: PlayerId) -> FeedResult<Vec<PricePoint>> {
        match self.price_histories.get(&player_id) {
            Some(history) => Ok(history.clone()),
            None if self.players.contains_key(&player_id) => Ok(Vec::new()),
            None => Err(FeedError::UnknownPlayer { player_id }),
        }
    }

    async fn health_check(&self) -> FeedResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pick;
    use squad_core::{Position, Price};

    fn feed_player(id: u32) -> FeedPlayer {
        FeedPlayer {
            id: PlayerId(id),
            name: format!("player-{id}"),
            position: Position::Midfielder,
            now_cost: Price::from_tenths(60),
            predicted_points: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn serves_fixture_data() {
        let mut feed = StaticFeed::new();
        feed.add_player(feed_player(1)).add_player(feed_player(2));
        feed.set_picks(GameweekPicks {
            participant_id: ParticipantId(5),
            gameweek: 3,
            picks: vec![Pick {
                player_id: PlayerId(1),
                slot: 1,
                is_captain: true,
                is_vice_captain: false,
            }],
            bank: Price::from_tenths(10),
            points_scored: 40,
        });

        assert_eq!(feed.player_pool().await.unwrap().len(), 2);
        assert_eq!(feed.player(PlayerId(2)).await.unwrap().id, PlayerId(2));
        assert!(feed.player(PlayerId(9)).await.is_err());
        let picks = feed.picks(ParticipantId(5), 3).await.unwrap();
        assert_eq!(picks.points_scored, 40);
    }

    #[tokio::test]
    async fn failing_picks_surface_as_retryable() {
        let mut feed = StaticFeed::new();
        feed.fail_picks(ParticipantId(5), 3);
        let err = feed.picks(ParticipantId(5), 3).await.unwrap_err();
        assert!(err.is_retryable());

        let missing = feed.picks(ParticipantId(5), 4).await.unwrap_err();
        assert!(!missing.is_retryable());
    }
}
