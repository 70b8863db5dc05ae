//! Pure domain rules for the fantasy squad engine
//!
//! This crate holds the value types and rules every other engine crate
//! builds on: squad and player state, the integer pricing arithmetic
//! (tenths of a currency unit), the selling-price formula, and the
//! chip registry with its availability windows. Nothing in here does
//! I/O; persistence and feed concerns live in the crates above.

pub mod chips;
pub mod price;
pub mod squad;
pub mod types;

pub use chips::{ChipError, ChipInstance, ChipInstanceId, ChipRegistry};
pub use price::{selling_price, Price};
pub use squad::{Squad, SquadError, SquadPlayer};
pub use types::{ChipKind, Gameweek, ParticipantId, PlayerId, Position};

/// First gameweek of a season.
pub const FIRST_GAMEWEEK: Gameweek = 1;

/// Last gameweek of a season.
pub const LAST_GAMEWEEK: Gameweek = 38;

/// Number of players in a squad.
pub const SQUAD_SIZE: usize = 15;

/// Slots 1..=STARTING_SLOTS are the starting eleven; the rest are reserves.
pub const STARTING_SLOTS: u8 = 11;

/// Cap on banked free transfers.
pub const MAX_FREE_TRANSFERS: u8 = 2;

/// Points charged for a transfer that is not free.
pub const TRANSFER_POINTS_COST: u32 = 4;

/// True if `gameweek` is inside the playable season range.
pub fn gameweek_in_season(gameweek: Gameweek) -> bool {
    (FIRST_GAMEWEEK..=LAST_GAMEWEEK).contains(&gameweek)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_bounds() {
        assert!(gameweek_in_season(1));
        assert!(gameweek_in_season(38));
        assert!(!gameweek_in_season(0));
        assert!(!gameweek_in_season(39));
    }
}
