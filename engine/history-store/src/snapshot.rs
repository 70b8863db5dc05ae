//! Squad snapshots keyed by (participant, gameweek, kind)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use squad_core::{ChipKind, Gameweek, ParticipantId, Price, Squad, SquadPlayer};
use uuid::Uuid;

/// What a snapshot was written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    /// End-of-gameweek record, at most one per (participant, gameweek).
    Regular,
    /// Written immediately before a free hit is confirmed, so the
    /// pre-chip squad can be restored exactly. May coexist with the
    /// regular snapshot for the same gameweek.
    PreChip,
}

impl SnapshotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Regular => "regular",
            SnapshotKind::PreChip => "pre_chip",
        }
    }
}

impl std::fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A full copy of a squad's state at the time of writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadSnapshot {
    pub id: Uuid,
    pub participant_id: ParticipantId,
    pub gameweek: Gameweek,
    pub kind: SnapshotKind,
    pub players: Vec<SquadPlayer>,
    pub bank: Price,
    pub squad_value: Price,
    pub free_transfers: u8,
    pub transfers_made_this_week: u32,
    pub points_deducted: u32,
    /// Points scored in this gameweek; 0 until scoring is known.
    pub points_scored: i32,
    /// The chip that was in effect when the snapshot was written.
    pub active_chip: Option<ChipKind>,
    pub recorded_at: DateTime<Utc>,
}

impl SquadSnapshot {
    /// Capture a squad's current state.
    pub fn capture(squad: &Squad, kind: SnapshotKind, points_scored: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            participant_id: squad.participant_id,
            gameweek: squad.gameweek,
            kind,
            players: squad.players.clone(),
            bank: squad.bank,
            squad_value: squad.squad_value,
            free_transfers: squad.free_transfers,
            transfers_made_this_week: squad.transfers_made_this_week,
            points_deducted: squad.points_deducted,
            points_scored,
            active_chip: squad.active_chip,
            recorded_at: Utc::now(),
        }
    }

    pub fn contains_player(&self, player_id: squad_core::PlayerId) -> bool {
        self.players.iter().any(|p| p.player_id == player_id)
    }

    pub fn player(&self, player_id: squad_core::PlayerId) -> Option<&SquadPlayer> {
        self.players.iter().find(|p| p.player_id == player_id)
    }
}
