//! Append-only transfer ledger entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use squad_core::{ChipKind, Gameweek, ParticipantId, PlayerId, Price};
use uuid::Uuid;

/// The incoming leg of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIn {
    pub player_id: PlayerId,
    /// Feed price paid for the player.
    pub price: Price,
}

/// The outgoing leg of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOut {
    pub player_id: PlayerId,
    pub purchase_price: Price,
    /// Price received per the profit-sharing formula.
    pub selling_price: Price,
}

/// One completed transfer, both legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: Uuid,
    pub participant_id: ParticipantId,
    pub gameweek: Gameweek,
    pub player_in: TransferIn,
    pub player_out: TransferOut,
    pub is_free: bool,
    /// 0 for a free transfer, otherwise the fixed deduction.
    pub points_cost: u32,
    /// Chip in effect when the transfer was made.
    pub chip_active: Option<ChipKind>,
    pub recorded_at: DateTime<Utc>,
}

impl TransferRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        participant_id: ParticipantId,
        gameweek: Gameweek,
        player_in: TransferIn,
        player_out: TransferOut,
        is_free: bool,
        points_cost: u32,
        chip_active: Option<ChipKind>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            participant_id,
            gameweek,
            player_in,
            player_out,
            is_free,
            points_cost,
            chip_active,
            recorded_at: Utc::now(),
        }
    }

    /// Net bank movement for this transfer (selling price received
    /// minus price paid).
    pub fn net_spend(&self) -> Price {
        self.player_in.price - self.player_out.selling_price
    }
}
