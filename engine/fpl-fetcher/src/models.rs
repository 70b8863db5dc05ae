//! Feed data shapes, wire DTOs and their domain mapping

use serde::{Deserialize, Serialize};
use squad_core::{Gameweek, ParticipantId, PlayerId, Position, Price};
use std::collections::HashMap;

/// One player from the bulk pool snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    /// Current feed price in tenths.
    pub now_cost: Price,
    /// Predicted points per gameweek, as far out as the feed knows.
    pub predicted_points: HashMap<Gameweek, f64>,
}

impl FeedPlayer {
    /// Cumulative predicted points over an inclusive gameweek window.
    pub fn predicted_over(&self, from: Gameweek, until: Gameweek) -> f64 {
        (from..=until).map(|gw| self.predicted_points.get(&gw).copied().unwrap_or(0.0)).sum()
    }
}

/// One entry in a participant's picks for a gameweek.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    pub player_id: PlayerId,
    /// 1..=15 squad slot.
    pub slot: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

/// A participant's picks for one gameweek, plus the financial state
/// the feed recorded alongside them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameweekPicks {
    pub participant_id: ParticipantId,
    pub gameweek: Gameweek,
    pub picks: Vec<Pick>,
    /// Bank at that time, in tenths.
    pub bank: Price,
    pub points_scored: i32,
}

impl GameweekPicks {
    pub fn contains_player(&self, player_id: PlayerId) -> bool {
        self.picks.iter().any(|p| p.player_id == player_id)
    }
}

/// One point in a player's price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub gameweek: Gameweek,
    pub price: Price,
}

// --- wire DTOs -------------------------------------------------------

/// Bulk snapshot response (`bootstrap-static`).
#[derive(Debug, Deserialize)]
pub(crate) struct RawBootstrap {
    #[serde(default)]
    pub events: Vec<RawEvent>,
    pub elements: Vec<RawElement>,
}

impl RawBootstrap {
    /// The gameweek the feed's next-gameweek forecasts apply to.
    pub(crate) fn next_gameweek(&self) -> Option<Gameweek> {
        self.events.iter().find(|e| e.is_next).map(|e| e.id)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEvent {
    pub id: Gameweek,
    #[serde(default)]
    pub is_next: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawElement {
    pub id: u32,
    pub web_name: String,
    /// 1 = goalkeeper, 2 = defender, 3 = midfielder, 4 = forward.
    pub element_type: u8,
    /// Price in tenths.
    pub now_cost: i64,
    /// Predicted points for the next gameweek, stringly typed on the
    /// wire.
    #[serde(default)]
    pub ep_next: Option<String>,
}

impl RawElement {
    pub(crate) fn into_feed_player(self, next_gameweek: Option<Gameweek>) -> Option<FeedPlayer> {
        let position = match self.element_type {
            1 => Position::Goalkeeper,
            2 => Position::Defender,
            3 => Position::Midfielder,
            4 => Position::Forward,
            other => {
                tracing::warn!(player = self.id, element_type = other, "unknown position, skipped");
                return None;
            }
        };
        let mut predicted_points = HashMap::new();
        if let (Some(gw), Some(ep)) = (next_gameweek, self.ep_next.as_deref()) {
            if let Ok(points) = ep.parse::<f64>() {
                predicted_points.insert(gw, points);
            }
        }
        Some(FeedPlayer {
            id: PlayerId(self.id),
            name: self.web_name,
            position,
            now_cost: Price::from_tenths(self.now_cost),
            predicted_points,
        })
    }
}

/// Picks response (`entry/{id}/event/{gw}/picks`).
#[derive(Debug, Deserialize)]
pub(crate) struct RawPicksResponse {
    pub picks: Vec<RawPick>,
    pub entry_history: RawEntryHistory,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPick {
    pub element: u32,
    /// Slot, 1..=15.
    pub position: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEntryHistory {
    /// Bank in tenths.
    pub bank: i64,
    pub points: i32,
}

impl RawPicksResponse {
    pub(crate) fn into_picks(
        self,
        participant_id: ParticipantId,
        gameweek: Gameweek,
    ) -> GameweekPicks {
        GameweekPicks {
            participant_id,
            gameweek,
            picks: self
                .picks
                .into_iter()
                .map(|p| Pick {
                    player_id: PlayerId(p.element),
                    slot: p.position,
                    is_captain: p.is_captain,
                    is_vice_captain: p.is_vice_captain,
                })
                .collect(),
            bank: Price::from_tenths(self.entry_history.bank),
            points_scored: self.entry_history.points,
        }
    }
}

/// Per-player summary response (`element-summary/{id}`), reduced to
/// the price-by-round history.
#[derive(Debug, Deserialize)]
pub(crate) struct RawElementSummary {
    pub history: Vec<RawRound>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRound {
    pub round: u8,
    /// Price that round, in tenths.
    pub value: i64,
}

impl RawElementSummary {
    pub(crate) fn into_price_history(self) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = self
            .history
            .into_iter()
            .map(|r| PricePoint { gameweek: r.round, price: Price::from_tenths(r.value) })
            .collect();
        points.sort_by_key(|p| p.gameweek);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_maps_position_and_forecast() {
        let raw = RawElement {
            id: 7,
            web_name: "Saka".to_string(),
            element_type: 3,
            now_cost: 87,
            ep_next: Some("6.2".to_string()),
        };
        let player = raw.into_feed_player(Some(12)).unwrap();
        assert_eq!(player.position, Position::Midfielder);
        assert_eq!(player.now_cost, Price::from_tenths(87));
        assert_eq!(player.predicted_points.get(&12), Some(&6.2));
    }

    #[test]
    fn element_with_unknown_position_is_skipped() {
        let raw = RawElement {
            id: 7,
            web_name: "Mystery".to_string(),
            element_type: 9,
            now_cost: 40,
            ep_next: None,
        };
        assert!(raw.into_feed_player(None).is_none());
    }

    #[test]
    fn predicted_over_sums_window() {
        let mut predicted_points = HashMap::new();
        predicted_points.insert(3, 4.0);
        predicted_points.insert(4, 5.5);
        predicted_points.insert(7, 9.0);
        let player = FeedPlayer {
            id: PlayerId(1),
            name: "x".to_string(),
            position: Position::Forward,
            now_cost: Price::from_tenths(60),
            predicted_points,
        };
        assert_eq!(player.predicted_over(3, 5), 9.5);
        assert_eq!(player.predicted_over(1, 38), 18.5);
    }
}
