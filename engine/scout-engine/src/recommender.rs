//! Recommendation drawing

use crate::config::ScoutConfig;
use crate::models::{Alternative, PriceBand, Recommendation};
use fpl_fetcher::FeedPlayer;
use squad_core::{Gameweek, PlayerId, Position, Price, Squad};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// Band draw order per candidate rank. The weakest owned player leans
/// premium, the second stays close to its price, the third leans
/// budget.
const BAND_MIXES: [[PriceBand; 5]; 3] = [
    [
        PriceBand::Premium,
        PriceBand::Similar,
        PriceBand::Premium,
        PriceBand::Budget,
        PriceBand::Similar,
    ],
    [
        PriceBand::Similar,
        PriceBand::Premium,
        PriceBand::Budget,
        PriceBand::Similar,
        PriceBand::Budget,
    ],
    [
        PriceBand::Budget,
        PriceBand::Similar,
        PriceBand::Budget,
        PriceBand::Premium,
        PriceBand::Similar,
    ],
];

pub struct ScoutEngine {
    config: ScoutConfig,
}

impl ScoutEngine {
    pub fn new(config: ScoutConfig) -> Self {
        Self { config }
    }

    /// Recommend replacements for the weakest owned players over the
    /// inclusive forecast window `from..=until`.
    pub fn recommend(
        &self,
        squad: &Squad,
        pool: &[FeedPlayer],
        from: Gameweek,
        until: Gameweek,
    ) -> Vec<Recommendation> {
        let by_id: HashMap<PlayerId, &FeedPlayer> = pool.iter().map(|p| (p.id, p)).collect();
        let owned: HashSet<PlayerId> = squad.players.iter().map(|p| p.player_id).collect();

        let mut per_position: HashMap<Position, Vec<(PlayerId, Price, f64)>> = HashMap::new();
        for entry in &squad.players {
            match by_id.get(&entry.player_id) {
                Some(feed) => per_position.entry(feed.position).or_default().push((
                    entry.player_id,
                    entry.current_price,
                    feed.predicted_over(from, until),
                )),
                None => {
                    warn!(player = %entry.player_id, "owned player missing from pool, skipped")
                }
            }
        }

        let mut recommendations = Vec::new();
        for (position, mut entries) in per_position {
            // Weakest first; id breaks forecast ties deterministically.
            entries.sort_by(|a, b| {
                a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0))
            });
            for (rank, (player_out, price, points)) in
                entries.iter().take(self.config.weak_per_position).enumerate()
            {
                recommendations.push(Recommendation {
                    player_out: *player_out,
                    position,
                    rank: rank as u8,
                    predicted_points: *points,
                    current_price: *price,
                    alternatives: self
                        .draw_alternatives(*price, *points, position, pool, &owned, rank, from, until),
                });
            }
        }
        recommendations.sort_by_key(|r| (r.position.as_str(), r.rank));
        recommendations
    }

    fn band_of(&self, price: Price, reference: Price) -> PriceBand {
        let diff = (price - reference).to_tenths();
        if diff.abs() <= self.config.similar_band_tenths {
            PriceBand::Similar
        } else if diff < 0 {
            PriceBand::Budget
        } else {
            PriceBand::Premium
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_alternatives(
        &self,
        reference: Price,
        floor_points: f64,
        position: Position,
        pool: &[FeedPlayer],
        owned: &HashSet<PlayerId>,
        rank: usize,
        from: Gameweek,
        until: Gameweek,
    ) -> Vec<Alternative> {
        // Strictly better scorers of the same position, never an owned
        // player.
        let mut eligible: Vec<Alternative> = pool
            .iter()
            .filter(|p| p.position == position && !owned.contains(&p.id))
            .map(|p| Alternative {
                player_id: p.id,
                name: p.name.clone(),
                price: p.now_cost,
                predicted_points: p.predicted_over(from, until),
                band: self.band_of(p.now_cost, reference),
            })
            .filter(|a| a.predicted_points > floor_points)
            .collect();
        eligible.sort_by(|a, b| {
            b.predicted_points
                .partial_cmp(&a.predicted_points)
                .unwrap_or(Ordering::Equal)
                .then(a.player_id.cmp(&b.player_id))
        });

        let mut queues: HashMap<PriceBand, VecDeque<Alternative>> = HashMap::new();
        for alt in &eligible {
            queues.entry(alt.band).or_default().push_back(alt.clone());
        }

        let mut picked: HashSet<PlayerId> = HashSet::new();
        let mut result = Vec::new();
        for band in BAND_MIXES[rank.min(BAND_MIXES.len() - 1)] {
            if result.len() >= self.config.max_alternatives {
                break;
            }
            if let Some(alt) = queues.get_mut(&band).and_then(|q| q.pop_front()) {
                picked.insert(alt.player_id);
                result.push(alt);
            }
        }
        // Back-fill from the remaining eligibles, best first.
        for alt in eligible {
            if result.len() >= self.config.max_alternatives {
                break;
            }
            if picked.insert(alt.player_id) {
                result.push(alt);
            }
        }
        result
    }
}
