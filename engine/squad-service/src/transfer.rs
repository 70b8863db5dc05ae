//! Per-gameweek transfer summaries

use history_store::TransferRecord;
use serde::{Deserialize, Serialize};
use squad_core::{Gameweek, Price};

/// Aggregate of a participant's transfer activity in one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSummary {
    pub gameweek: Gameweek,
    pub transfers: u32,
    pub free_transfers_used: u32,
    pub points_cost: u32,
    /// Total received for outgoing players.
    pub money_in: Price,
    /// Total paid for incoming players.
    pub money_out: Price,
}

impl TransferSummary {
    pub fn from_records(gameweek: Gameweek, records: &[TransferRecord]) -> Self {
        let mut summary = TransferSummary {
            gameweek,
            transfers: 0,
            free_transfers_used: 0,
            points_cost: 0,
            money_in: Price::ZERO,
            money_out: Price::ZERO,
        };
        for record in records.iter().filter(|r| r.gameweek == gameweek) {
            summary.transfers += 1;
            if record.is_free {
                summary.free_transfers_used += 1;
            }
            summary.points_cost += record.points_cost;
            summary.money_in += record.player_out.selling_price;
            summary.money_out += record.player_in.price;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use history_store::{TransferIn, TransferOut};
    use squad_core::{ParticipantId, PlayerId};

    fn record(gameweek: Gameweek, is_free: bool, paid: i64, received: i64) -> TransferRecord {
        TransferRecord::new(
            ParticipantId(1),
            gameweek,
            TransferIn { player_id: PlayerId(10), price: Price::from_tenths(paid) },
            TransferOut {
                player_id: PlayerId(4),
                purchase_price: Price::from_tenths(received),
                selling_price: Price::from_tenths(received),
            },
            is_free,
            if is_free { 0 } else { 4 },
            None,
        )
    }

    #[test]
    fn summary_counts_only_the_requested_gameweek() {
        let records =
            vec![record(4, true, 70, 50), record(4, false, 60, 45), record(5, true, 80, 55)];
        let summary = TransferSummary::from_records(4, &records);
        assert_eq!(summary.transfers, 2);
        assert_eq!(summary.free_transfers_used, 1);
        assert_eq!(summary.points_cost, 4);
        assert_eq!(summary.money_in, Price::from_tenths(95));
        assert_eq!(summary.money_out, Price::from_tenths(130));
    }

    #[test]
    fn summary_of_idle_gameweek_is_zero() {
        let summary = TransferSummary::from_records(9, &[record(4, true, 70, 50)]);
        assert_eq!(summary.transfers, 0);
        assert_eq!(summary.money_in, Price::ZERO);
        assert_eq!(summary.money_out, Price::ZERO);
    }
}
