//! Chip registry: eight one-time-use instances per participant
//!
//! Two instances of each kind, one per half of the season. The
//! registry is an explicit keyed map; "which instance was used this
//! gameweek" is answered by the `used_in_gameweek` index rather than
//! by walking record shapes.

use crate::types::{ChipKind, Gameweek};
use crate::{FIRST_GAMEWEEK, LAST_GAMEWEEK};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Gameweeks a free hit must be apart from the previous one.
pub const FREE_HIT_SPACING: Gameweek = 2;

/// Last gameweek of the first-half availability window.
pub const FIRST_HALF_END: Gameweek = 19;

/// Key for one chip instance: kind plus season half (1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChipInstanceId {
    pub kind: ChipKind,
    pub half: u8,
}

impl fmt::Display for ChipInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.half)
    }
}

/// One consumable chip instance and its availability window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipInstance {
    pub id: ChipInstanceId,
    pub available: bool,
    pub used_in_gameweek: Option<Gameweek>,
    /// Inclusive window bounds.
    pub available_from: Gameweek,
    pub available_until: Gameweek,
}

impl ChipInstance {
    fn in_window(&self, gameweek: Gameweek) -> bool {
        (self.available_from..=self.available_until).contains(&gameweek)
    }
}

/// Failures raised by registry transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChipError {
    #[error("unknown chip instance {kind}/{half}")]
    UnknownInstance { kind: ChipKind, half: u8 },

    #[error("chip {id} was already used in gameweek {used_in}")]
    AlreadyUsed { id: ChipInstanceId, used_in: Gameweek },

    #[error("chip {id} is not available in gameweek {gameweek} (window {from}..={until})")]
    OutsideWindow { id: ChipInstanceId, gameweek: Gameweek, from: Gameweek, until: Gameweek },

    #[error("no chip was consumed in gameweek {gameweek}")]
    NothingToRestore { gameweek: Gameweek },
}

/// Per-participant chip state: eight instances, two of each kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipRegistry {
    instances: HashMap<ChipInstanceId, ChipInstance>,
}

impl ChipRegistry {
    /// A fresh registry with every instance available: half 1 covers
    /// gameweeks 1..=19, half 2 covers 20..=38.
    pub fn new() -> Self {
        let mut instances = HashMap::with_capacity(8);
        for kind in ChipKind::ALL {
            for (half, from, until) in [
                (1, FIRST_GAMEWEEK, FIRST_HALF_END),
                (2, FIRST_HALF_END + 1, LAST_GAMEWEEK),
            ] {
                let id = ChipInstanceId { kind, half };
                instances.insert(
                    id,
                    ChipInstance {
                        id,
                        available: true,
                        used_in_gameweek: None,
                        available_from: from,
                        available_until: until,
                    },
                );
            }
        }
        Self { instances }
    }

    pub fn instance(&self, id: ChipInstanceId) -> Option<&ChipInstance> {
        self.instances.get(&id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &ChipInstance> {
        self.instances.values()
    }

    /// The most recent gameweek a free hit was consumed in, if any.
    /// Cancelled consumptions are restored and no longer count.
    pub fn last_free_hit(&self) -> Option<Gameweek> {
        self.instances
            .values()
            .filter(|i| i.id.kind == ChipKind::FreeHit)
            .filter_map(|i| i.used_in_gameweek)
            .max()
    }

    /// True when a free hit in `gameweek` would violate the spacing
    /// rule against the last free hit.
    pub fn free_hit_blocked(gameweek: Gameweek, last_free_hit: Option<Gameweek>) -> bool {
        match last_free_hit {
            Some(last) => gameweek < last.saturating_add(FREE_HIT_SPACING),
            None => false,
        }
    }

    /// Instances usable in `gameweek`: available, inside their window,
    /// and for free hits not blocked by the spacing rule.
    pub fn list_available(
        &self,
        gameweek: Gameweek,
        last_free_hit: Option<Gameweek>,
    ) -> Vec<ChipInstanceId> {
        let mut ids: Vec<ChipInstanceId> = self
            .instances
            .values()
            .filter(|i| i.available && i.in_window(gameweek))
            .filter(|i| {
                i.id.kind != ChipKind::FreeHit || !Self::free_hit_blocked(gameweek, last_free_hit)
            })
            .map(|i| i.id)
            .collect();
        ids.sort_by_key(|id| (id.kind.as_str(), id.half));
        ids
    }

    /// Consume an instance. An instance transitions available -> used
    /// exactly once; only [`ChipRegistry::restore`] reverses it.
    pub fn consume(&mut self, id: ChipInstanceId, gameweek: Gameweek) -> Result<(), ChipError> {
        let instance = self
            .instances
            .get_mut(&id)
            .ok_or(ChipError::UnknownInstance { kind: id.kind, half: id.half })?;
        if let Some(used_in) = instance.used_in_gameweek {
            return Err(ChipError::AlreadyUsed { id, used_in });
        }
        if !instance.in_window(gameweek) {
            return Err(ChipError::OutsideWindow {
                id,
                gameweek,
                from: instance.available_from,
                until: instance.available_until,
            });
        }
        instance.available = false;
        instance.used_in_gameweek = Some(gameweek);
        tracing::debug!(chip = %id, gameweek, "chip consumed");
        Ok(())
    }

    /// Reverse the consumption made in `gameweek_used` (chip
    /// cancellation). The keyed index makes the lookup exact.
    pub fn restore(&mut self, gameweek_used: Gameweek) -> Result<ChipInstanceId, ChipError> {
        let instance = self
            .instances
            .values_mut()
            .find(|i| i.used_in_gameweek == Some(gameweek_used))
            .ok_or(ChipError::NothingToRestore { gameweek: gameweek_used })?;
        instance.available = true;
        instance.used_in_gameweek = None;
        tracing::debug!(chip = %instance.id, gameweek = gameweek_used, "chip restored");
        Ok(instance.id)
    }
}

impl Default for ChipRegistry {
    fn default() -> Self {
        Self::new()
    }
}
