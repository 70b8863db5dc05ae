//! Identifier and category types shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gameweek number, 1..=38.
pub type Gameweek = u8;

/// External player identifier, as issued by the data feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Participant (squad owner) identifier. Identity is supplied by the
/// caller; this crate never authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position category of a player. Transfers must preserve the
/// position composition of the squad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeeper",
            Position::Defender => "defender",
            Position::Midfielder => "midfielder",
            Position::Forward => "forward",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four one-time-use chip kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipKind {
    BenchBoost,
    TripleCaptain,
    FreeHit,
    Wildcard,
}

impl ChipKind {
    pub const ALL: [ChipKind; 4] = [
        ChipKind::BenchBoost,
        ChipKind::TripleCaptain,
        ChipKind::FreeHit,
        ChipKind::Wildcard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChipKind::BenchBoost => "bench_boost",
            ChipKind::TripleCaptain => "triple_captain",
            ChipKind::FreeHit => "free_hit",
            ChipKind::Wildcard => "wildcard",
        }
    }

    /// Wildcard and free hit make every transfer free for the rest of
    /// the gameweek.
    pub fn grants_unlimited_transfers(&self) -> bool {
        matches!(self, ChipKind::Wildcard | ChipKind::FreeHit)
    }

    /// Wildcard and free hit are irreversible once activated.
    pub fn is_cancellable(&self) -> bool {
        !matches!(self, ChipKind::Wildcard | ChipKind::FreeHit)
    }
}

impl fmt::Display for ChipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChipKind {
    type Err = UnknownChipKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bench_boost" => Ok(ChipKind::BenchBoost),
            "triple_captain" => Ok(ChipKind::TripleCaptain),
            "free_hit" => Ok(ChipKind::FreeHit),
            "wildcard" => Ok(ChipKind::Wildcard),
            other => Err(UnknownChipKind { name: other.to_string() }),
        }
    }
}

/// Rejection for a chip name that is not one of the four kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chip kind: {name}")]
pub struct UnknownChipKind {
    pub name: String,
}
