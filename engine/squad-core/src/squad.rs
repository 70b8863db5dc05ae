//! Squad and squad-player value types
//!
//! These are plain values with pure rule methods; persistence and the
//! operation flow around them live in `squad-service`.

use crate::price::Price;
use crate::types::{ChipKind, Gameweek, ParticipantId, PlayerId};
use crate::{MAX_FREE_TRANSFERS, SQUAD_SIZE, STARTING_SLOTS};
use serde::{Deserialize, Serialize};

/// One of the fifteen slots in a squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadPlayer {
    pub player_id: PlayerId,
    /// 1..=15; 1..=11 are the starting eleven, 12..=15 the bench.
    pub slot: u8,
    pub purchase_price: Price,
    pub current_price: Price,
    pub is_captain: bool,
    pub is_vice_captain: bool,
    /// 1 = normal, 2 = captain, 3 = triple-captain boosted.
    pub multiplier: u8,
}

impl SquadPlayer {
    pub fn is_starting(&self) -> bool {
        self.slot <= STARTING_SLOTS
    }
}

/// The authoritative per-participant roster state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    pub participant_id: ParticipantId,
    /// The gameweek this state is valid for.
    pub gameweek: Gameweek,
    pub players: Vec<SquadPlayer>,
    pub bank: Price,
    /// Derived: sum of current prices plus bank. Recomputed on every
    /// mutation via [`Squad::recompute_value`].
    pub squad_value: Price,
    /// Banked free transfers, 0..=2.
    pub free_transfers: u8,
    pub transfers_made_this_week: u32,
    pub points_deducted: u32,
    pub active_chip: Option<ChipKind>,
}

/// Structural invariant violations on a squad value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SquadError {
    #[error("squad must have {SQUAD_SIZE} players, got {actual}")]
    WrongSize { actual: usize },

    #[error("slot {slot} out of range 1..=15")]
    SlotOutOfRange { slot: u8 },

    #[error("duplicate slot {slot}")]
    DuplicateSlot { slot: u8 },

    #[error("player {player_id} appears more than once")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("squad has no captain")]
    NoCaptain,

    #[error("squad has more than one captain")]
    MultipleCaptains,

    #[error("squad has more than one vice captain")]
    MultipleViceCaptains,

    #[error("player {player_id} not in squad")]
    PlayerNotInSquad { player_id: PlayerId },
}

impl Squad {
    /// Build a fresh squad from initial picks. Purchase prices equal
    /// current prices: a new squad has no prior ownership history.
    pub fn new(
        participant_id: ParticipantId,
        gameweek: Gameweek,
        players: Vec<SquadPlayer>,
        bank: Price,
    ) -> Result<Self, SquadError> {
        let mut squad = Squad {
            participant_id,
            gameweek,
            players,
            bank,
            squad_value: Price::ZERO,
            free_transfers: 1,
            transfers_made_this_week: 0,
            points_deducted: 0,
            active_chip: None,
        };
        squad.players.sort_by_key(|p| p.slot);
        squad.validate()?;
        squad.recompute_value();
        Ok(squad)
    }

    /// Check the structural invariants: fifteen players, unique slots
    /// 1..=15, unique player ids, exactly one captain, at most one
    /// vice captain.
    pub fn validate(&self) -> Result<(), SquadError> {
        if self.players.len() != SQUAD_SIZE {
            return Err(SquadError::WrongSize { actual: self.players.len() });
        }
        let mut seen_slots = [false; SQUAD_SIZE];
        for p in &self.players {
            if !(1..=SQUAD_SIZE as u8).contains(&p.slot) {
                return Err(SquadError::SlotOutOfRange { slot: p.slot });
            }
            let idx = (p.slot - 1) as usize;
            if seen_slots[idx] {
                return Err(SquadError::DuplicateSlot { slot: p.slot });
            }
            seen_slots[idx] = true;
        }
        for (i, p) in self.players.iter().enumerate() {
            if self.players[i + 1..].iter().any(|q| q.player_id == p.player_id) {
                return Err(SquadError::DuplicatePlayer { player_id: p.player_id });
            }
        }
        match self.players.iter().filter(|p| p.is_captain).count() {
            0 => return Err(SquadError::NoCaptain),
            1 => {}
            _ => return Err(SquadError::MultipleCaptains),
        }
        if self.players.iter().filter(|p| p.is_vice_captain).count() > 1 {
            return Err(SquadError::MultipleViceCaptains);
        }
        Ok(())
    }

    /// Recompute the derived squad value.
    pub fn recompute_value(&mut self) {
        self.squad_value = self.players.iter().map(|p| p.current_price).sum::<Price>() + self.bank;
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.player_id == player_id)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&SquadPlayer> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut SquadPlayer> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    pub fn captain(&self) -> Option<&SquadPlayer> {
        self.players.iter().find(|p| p.is_captain)
    }

    pub fn captain_mut(&mut self) -> Option<&mut SquadPlayer> {
        self.players.iter_mut().find(|p| p.is_captain)
    }

    /// Replace `player_out` in place with `player_in` at the incoming
    /// feed price. The slot, captaincy flags and multiplier stay with
    /// the slot, not the player.
    pub fn replace_player(
        &mut self,
        player_out: PlayerId,
        player_in: PlayerId,
        price_in: Price,
    ) -> Result<(), SquadError> {
        if self.contains(player_in) {
            return Err(SquadError::DuplicatePlayer { player_id: player_in });
        }
        let entry = self
            .player_mut(player_out)
            .ok_or(SquadError::PlayerNotInSquad { player_id: player_out })?;
        entry.player_id = player_in;
        entry.purchase_price = price_in;
        entry.current_price = price_in;
        self.recompute_value();
        Ok(())
    }

    /// Weekly free-transfer accrual at gameweek rollover: an idle week
    /// banks one extra transfer up to the cap, any activity resets the
    /// allowance to one.
    pub fn accrue_free_transfers(&mut self) {
        if self.transfers_made_this_week == 0 {
            self.free_transfers = (self.free_transfers + 1).min(MAX_FREE_TRANSFERS);
        } else {
            self.free_transfers = 1;
        }
    }

    /// Enter a new gameweek: weekly counters reset, any active chip
    /// expires.
    pub fn roll_into(&mut self, new_gameweek: Gameweek) {
        self.gameweek = new_gameweek;
        self.transfers_made_this_week = 0;
        self.points_deducted = 0;
        self.active_chip = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, slot: u8, price: i64) -> SquadPlayer {
        SquadPlayer {
            player_id: PlayerId(id),
            slot,
            purchase_price: Price::from_tenths(price),
            current_price: Price::from_tenths(price),
            is_captain: slot == 1,
            is_vice_captain: slot == 2,
            multiplier: if slot == 1 { 2 } else { 1 },
        }
    }

    fn squad() -> Squad {
        let players = (1..=15).map(|s| player(s as u32, s, 50 + s as i64)).collect();
        Squad::new(ParticipantId(7), 3, players, Price::from_tenths(10)).unwrap()
    }

    #[test]
    fn new_squad_defaults() {
        let s = squad();
        assert_eq!(s.free_transfers, 1);
        assert_eq!(s.transfers_made_this_week, 0);
        assert_eq!(s.points_deducted, 0);
        assert_eq!(s.active_chip, None);
        let expected: i64 = (1..=15).map(|s| 50 + s).sum::<i64>() + 10;
        assert_eq!(s.squad_value, Price::from_tenths(expected));
    }

    #[test]
    fn validate_rejects_duplicate_slot() {
        let mut s = squad();
        s.players[3].slot = 5;
        assert_eq!(s.validate(), Err(SquadError::DuplicateSlot { slot: 5 }));
    }

    #[test]
    fn validate_requires_exactly_one_captain() {
        let mut s = squad();
        s.players[0].is_captain = false;
        assert_eq!(s.validate(), Err(SquadError::NoCaptain));
        s.players[0].is_captain = true;
        s.players[4].is_captain = true;
        assert_eq!(s.validate(), Err(SquadError::MultipleCaptains));
    }

    #[test]
    fn replace_keeps_slot_and_captaincy() {
        let mut s = squad();
        s.replace_player(PlayerId(1), PlayerId(99), Price::from_tenths(80)).unwrap();
        let entry = s.player(PlayerId(99)).unwrap();
        assert_eq!(entry.slot, 1);
        assert!(entry.is_captain);
        assert_eq!(entry.multiplier, 2);
        assert_eq!(entry.purchase_price, Price::from_tenths(80));
        assert!(!s.contains(PlayerId(1)));
    }

    #[test]
    fn replace_rejects_owned_player() {
        let mut s = squad();
        let err = s.replace_player(PlayerId(1), PlayerId(2), Price::from_tenths(80)).unwrap_err();
        assert_eq!(err, SquadError::DuplicatePlayer { player_id: PlayerId(2) });
    }

    #[test]
    fn accrual_caps_at_two() {
        let mut s = squad();
        assert_eq!(s.free_transfers, 1);
        s.accrue_free_transfers();
        assert_eq!(s.free_transfers, 2);
        // Another idle week does not grow the bank to three.
        s.accrue_free_transfers();
        assert_eq!(s.free_transfers, 2);
    }

    #[test]
    fn accrual_resets_after_activity() {
        let mut s = squad();
        s.free_transfers = 2;
        s.transfers_made_this_week = 3;
        s.accrue_free_transfers();
        assert_eq!(s.free_transfers, 1);
    }

    #[test]
    fn roll_into_clears_weekly_state() {
        let mut s = squad();
        s.transfers_made_this_week = 2;
        s.points_deducted = 4;
        s.active_chip = Some(ChipKind::BenchBoost);
        s.roll_into(4);
        assert_eq!(s.gameweek, 4);
        assert_eq!(s.transfers_made_this_week, 0);
        assert_eq!(s.points_deducted, 0);
        assert_eq!(s.active_chip, None);
    }
}
