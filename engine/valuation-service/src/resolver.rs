//! Purchase-price resolution

use crate::config::ValuationConfig;
use crate::error::Result;
use dashmap::DashMap;
use fpl_fetcher::{GameweekPicks, PlayerFeed};
use futures::stream::{self, StreamExt};
use history_store::HistoryBackend;
use serde::{Deserialize, Serialize};
use squad_core::{Gameweek, ParticipantId, PlayerId, Price};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub purchase_price: Price,
    /// Start of the latest uninterrupted ownership interval.
    pub gameweek_added: Gameweek,
}

/// Resolves what a participant paid for a player as of a gameweek.
pub struct PriceResolver {
    history: Arc<dyn HistoryBackend>,
    feed: Arc<dyn PlayerFeed>,
    config: ValuationConfig,
    cache: DashMap<(ParticipantId, PlayerId, Gameweek), ResolvedPrice>,
}

impl PriceResolver {
    pub fn new(
        history: Arc<dyn HistoryBackend>,
        feed: Arc<dyn PlayerFeed>,
        config: ValuationConfig,
    ) -> Self {
        Self { history, feed, config, cache: DashMap::new() }
    }

    /// Resolve the purchase price of `player_id` for `participant` as
    /// of `as_of_gameweek`.
    ///
    /// The snapshot history is authoritative when it covers the
    /// participant; otherwise ownership is reconstructed from the
    /// picks feed. `Ok(None)` means the player's price could not be
    /// established (not owned, or the reconstruction degraded);
    /// callers omit purchase/selling prices rather than failing.
    pub async fn resolve_purchase_price(
        &self,
        participant: ParticipantId,
        player_id: PlayerId,
        as_of_gameweek: Gameweek,
    ) -> Result<Option<ResolvedPrice>> {
        let key = (participant, player_id, as_of_gameweek);
        if self.config.cache_enabled {
            if let Some(hit) = self.cache.get(&key) {
                return Ok(Some(*hit));
            }
        }

        let snapshots = self.history.regular_snapshots_desc(participant).await?;
        let resolved = if snapshots.iter().any(|s| s.gameweek <= as_of_gameweek) {
            resolve_from_history(&snapshots, participant, player_id, as_of_gameweek)
        } else {
            self.reconstruct_from_picks(participant, player_id, as_of_gameweek).await?
        };

        if self.config.cache_enabled {
            if let Some(resolved) = resolved {
                self.cache.insert(key, resolved);
            }
        }
        Ok(resolved)
    }

    /// Fallback path for participants without usable snapshots:
    /// rebuild ownership intervals from the external picks history,
    /// one gameweek at a time with bounded concurrency. A gameweek
    /// that fails to fetch is logged and treated as unknown; it never
    /// aborts the reconstruction, but an interval boundary hidden by
    /// the gap leaves the player unresolved.
    async fn reconstruct_from_picks(
        &self,
        participant: ParticipantId,
        player_id: PlayerId,
        as_of_gameweek: Gameweek,
    ) -> Result<Option<ResolvedPrice>> {
        let picks_by_gameweek = self.fetch_picks_range(participant, as_of_gameweek).await;
        if picks_by_gameweek.values().all(|p| p.is_none()) {
            debug!(%participant, "no picks history available, price unresolved");
            return Ok(None);
        }

        let start = match latest_interval_start(&picks_by_gameweek, player_id, as_of_gameweek) {
            IntervalStart::Known(gameweek) => gameweek,
            IntervalStart::NotOwned => return Ok(None),
            IntervalStart::Uncertain => {
                warn!(
                    %participant, %player_id,
                    "picks gaps hide the acquisition gameweek, price unresolved"
                );
                return Ok(None);
            }
        };

        let history = self.feed.price_history(player_id).await?;
        let price_at_start =
            history.iter().rev().find(|p| p.gameweek <= start).map(|p| p.price);
        match price_at_start {
            Some(price) => {
                debug!(
                    %participant, %player_id, gameweek_added = start,
                    "purchase price reconstructed from picks history"
                );
                Ok(Some(ResolvedPrice { purchase_price: price, gameweek_added: start }))
            }
            None => {
                warn!(
                    %participant, %player_id, gameweek_added = start,
                    "no feed price at acquisition gameweek, price unresolved"
                );
                Ok(None)
            }
        }
    }

    /// Fetch picks for gameweeks 1..=until with bounded concurrency.
    /// Failures become `None` entries.
    async fn fetch_picks_range(
        &self,
        participant: ParticipantId,
        until: Gameweek,
    ) -> HashMap<Gameweek, Option<GameweekPicks>> {
        let feed = Arc::clone(&self.feed);
        let results: Vec<(Gameweek, Option<GameweekPicks>)> = stream::iter(1..=until)
            .map(|gameweek| {
                let feed = Arc::clone(&feed);
                async move {
                    match feed.picks(participant, gameweek).await {
                        Ok(picks) => (gameweek, Some(picks)),
                        Err(e) => {
                            warn!(%participant, gameweek, error = %e, "picks fetch failed, gameweek skipped");
                            (gameweek, None)
                        }
                    }
                }
            })
            .buffer_unordered(self.config.max_concurrent_fetches.max(1))
            .collect()
            .await;
        results.into_iter().collect()
    }
}

/// History path: walk regular snapshots newest-first, extending the
/// most recent contiguous ownership run backward. The oldest snapshot
/// of that run is the acquisition; its stored purchase price is
/// authoritative. A "bought, sold, re-bought" player resolves to the
/// latest interval because the walk stops at the first snapshot
/// without the player.
fn resolve_from_history(
    snapshots: &[history_store::SquadSnapshot],
    participant: ParticipantId,
    player_id: PlayerId,
    as_of_gameweek: Gameweek,
) -> Option<ResolvedPrice> {
    let mut acquisition: Option<ResolvedPrice> = None;
    for snapshot in snapshots.iter().filter(|s| s.gameweek <= as_of_gameweek) {
        match snapshot.player(player_id) {
            Some(entry) => {
                acquisition = Some(ResolvedPrice {
                    purchase_price: entry.purchase_price,
                    gameweek_added: snapshot.gameweek,
                });
            }
            // Absent from the most recent snapshot: not currently
            // owned. Absent further back: the run is complete.
            None => break,
        }
    }
    if let Some(resolved) = acquisition {
        debug!(
            %participant, %player_id,
            gameweek_added = resolved.gameweek_added,
            "purchase price resolved from snapshot history"
        );
    }
    acquisition
}

enum IntervalStart {
    Known(Gameweek),
    NotOwned,
    Uncertain,
}

/// Scan picks membership ascending and find the start of the latest
/// ownership interval for `player_id`.
fn latest_interval_start(
    picks_by_gameweek: &HashMap<Gameweek, Option<GameweekPicks>>,
    player_id: PlayerId,
    as_of_gameweek: Gameweek,
) -> IntervalStart {
    // None = unknown gameweek (fetch failed); Some(owned) otherwise.
    let mut previous: Option<bool> = Some(false); // before the season, nobody is owned
    let mut start: Option<Gameweek> = None;
    let mut start_uncertain = false;

    for gameweek in 1..=as_of_gameweek {
        match picks_by_gameweek.get(&gameweek).and_then(|p| p.as_ref()) {
            Some(picks) => {
                let owned = picks.contains_player(player_id);
                if owned {
                    match previous {
                        Some(true) => {} // interval continues
                        Some(false) => {
                            start = Some(gameweek);
                            start_uncertain = false;
                        }
                        // The gameweek before this one is unknown: the
                        // interval may have started inside the gap.
                        None => {
                            start = Some(gameweek);
                            start_uncertain = true;
                        }
                    }
                } else {
                    start = None;
                }
                previous = Some(owned);
            }
            None => previous = None,
        }
    }

    match (start, previous) {
        // Trailing unknown gameweeks: current ownership state is not
        // established.
        (_, None) => IntervalStart::Uncertain,
        (Some(_), Some(false)) | (None, _) => IntervalStart::NotOwned,
        (Some(gameweek), Some(true)) => {
            if start_uncertain {
                IntervalStart::Uncertain
            } else {
                IntervalStart::Known(gameweek)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpl_fetcher::{Pick, StaticFeed};
    use history_store::{InMemoryHistory, SnapshotKind, SquadSnapshot};
    use squad_core::{Squad, SquadPlayer};

    const OWNER: ParticipantId = ParticipantId(42);

    fn squad_with(players: &[u32], gameweek: Gameweek, purchase: i64) -> Squad {
        let entries = players
            .iter()
            .enumerate()
            .map(|(i, id)| SquadPlayer {
                player_id: PlayerId(*id),
                slot: (i + 1) as u8,
                purchase_price: Price::from_tenths(purchase),
                current_price: Price::from_tenths(purchase),
                is_captain: i == 0,
                is_vice_captain: i == 1,
                multiplier: if i == 0 { 2 } else { 1 },
            })
            .collect();
        Squad::new(OWNER, gameweek, entries, Price::ZERO).unwrap()
    }

    fn fifteen_with(extra: u32) -> Vec<u32> {
        // 14 fillers plus one player of interest.
        let mut ids: Vec<u32> = (100..114).collect();
        ids.push(extra);
        ids
    }

    fn picks_for(players: &[u32], gameweek: Gameweek) -> GameweekPicks {
        GameweekPicks {
            participant_id: OWNER,
            gameweek,
            picks: players
                .iter()
                .enumerate()
                .map(|(i, id)| Pick {
                    player_id: PlayerId(*id),
                    slot: (i + 1) as u8,
                    is_captain: i == 0,
                    is_vice_captain: i == 1,
                })
                .collect(),
            bank: Price::ZERO,
            points_scored: 0,
        }
    }

    fn resolver(history: InMemoryHistory, feed: StaticFeed) -> PriceResolver {
        PriceResolver::new(Arc::new(history), Arc::new(feed), ValuationConfig::default())
    }

    #[tokio::test]
    async fn history_reports_latest_ownership_interval() {
        let history = InMemoryHistory::new();
        // Owned in 1..=2 at 50, sold in 3, re-bought in 4 at 70.
        for (gw, players, price) in [
            (1u8, fifteen_with(7), 50i64),
            (2, fifteen_with(7), 50),
            (3, fifteen_with(99), 50),
            (4, fifteen_with(7), 70),
            (5, fifteen_with(7), 70),
        ] {
            let mut squad = squad_with(&players, gw, 50);
            if let Some(p) = squad.player_mut(PlayerId(7)) {
                p.purchase_price = Price::from_tenths(price);
            }
            history.put_snapshot(SquadSnapshot::capture(&squad, SnapshotKind::Regular, 0)).await.unwrap();
        }

        let resolver = resolver(history, StaticFeed::new());
        let resolved = resolver
            .resolve_purchase_price(OWNER, PlayerId(7), 5)
            .await
            .unwrap()
            .expect("resolved");
        assert_eq!(resolved.gameweek_added, 4);
        assert_eq!(resolved.purchase_price, Price::from_tenths(70));
    }

    #[tokio::test]
    async fn history_as_of_sees_earlier_interval() {
        let history = InMemoryHistory::new();
        for (gw, players) in
            [(1u8, fifteen_with(7)), (2, fifteen_with(7)), (3, fifteen_with(99))]
        {
            let squad = squad_with(&players, gw, 50);
            history.put_snapshot(SquadSnapshot::capture(&squad, SnapshotKind::Regular, 0)).await.unwrap();
        }

        let resolver = resolver(history, StaticFeed::new());
        // As of gameweek 2 the player was owned since gameweek 1.
        let resolved = resolver
            .resolve_purchase_price(OWNER, PlayerId(7), 2)
            .await
            .unwrap()
            .expect("resolved");
        assert_eq!(resolved.gameweek_added, 1);
        // As of gameweek 3 the player is gone.
        assert!(resolver.resolve_purchase_price(OWNER, PlayerId(7), 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fallback_reconstructs_from_picks() {
        let history = InMemoryHistory::new();
        let mut feed = StaticFeed::new();
        // Not owned in 1..=2, bought in 3.
        feed.set_picks(picks_for(&fifteen_with(99), 1));
        feed.set_picks(picks_for(&fifteen_with(99), 2));
        feed.set_picks(picks_for(&fifteen_with(7), 3));
        feed.set_picks(picks_for(&fifteen_with(7), 4));
        feed.add_player(fpl_fetcher::FeedPlayer {
            id: PlayerId(7),
            name: "seven".to_string(),
            position: squad_core::Position::Forward,
            now_cost: Price::from_tenths(82),
            predicted_points: HashMap::new(),
        });
        feed.set_price_history(
            PlayerId(7),
            vec![
                fpl_fetcher::PricePoint { gameweek: 1, price: Price::from_tenths(75) },
                fpl_fetcher::PricePoint { gameweek: 3, price: Price::from_tenths(78) },
                fpl_fetcher::PricePoint { gameweek: 4, price: Price::from_tenths(80) },
            ],
        );

        let resolver = resolver(history, feed);
        let resolved = resolver
            .resolve_purchase_price(OWNER, PlayerId(7), 4)
            .await
            .unwrap()
            .expect("resolved");
        assert_eq!(resolved.gameweek_added, 3);
        assert_eq!(resolved.purchase_price, Price::from_tenths(78));
    }

    #[tokio::test]
    async fn fallback_gap_degrades_that_player_only() {
        let history = InMemoryHistory::new();
        let mut feed = StaticFeed::new();
        // Gameweek 2 fetch fails; the player appears in 3. The
        // acquisition could be 2 or 3, so the price stays unresolved.
        feed.set_picks(picks_for(&fifteen_with(99), 1));
        feed.fail_picks(OWNER, 2);
        feed.set_picks(picks_for(&fifteen_with(7), 3));

        let resolver = resolver(history, feed);
        assert!(resolver.resolve_purchase_price(OWNER, PlayerId(7), 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fallback_gap_inside_interval_is_conservative() {
        let history = InMemoryHistory::new();
        let mut feed = StaticFeed::new();
        // Owned in 1 and in 3, but gameweek 2 is unknown: the player
        // could have been sold and re-bought inside the gap.
        feed.set_picks(picks_for(&fifteen_with(7), 1));
        feed.fail_picks(OWNER, 2);
        feed.set_picks(picks_for(&fifteen_with(7), 3));
        feed.set_price_history(
            PlayerId(7),
            vec![fpl_fetcher::PricePoint { gameweek: 1, price: Price::from_tenths(60) }],
        );
        feed.add_player(fpl_fetcher::FeedPlayer {
            id: PlayerId(7),
            name: "seven".to_string(),
            position: squad_core::Position::Forward,
            now_cost: Price::from_tenths(60),
            predicted_points: HashMap::new(),
        });

        let resolver = resolver(history, feed);
        let resolved = resolver.resolve_purchase_price(OWNER, PlayerId(7), 3).await.unwrap();
        // The gameweek-3 sighting follows an unknown gameweek, so the
        // conservative answer is unresolved; the gameweek-1 interval
        // cannot be proven unbroken.
        assert!(resolved.is_none());
    }
}
