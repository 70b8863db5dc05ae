//! SquadService implementation

use crate::error::{Result, SquadServiceError};
use crate::transfer::TransferSummary;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fpl_fetcher::{FeedError, FeedPlayer, PlayerFeed};
use history_store::{
    HistoryBackend, SnapshotKind, SquadSnapshot, TransferIn, TransferOut, TransferRecord,
};
use squad_core::{
    gameweek_in_season, selling_price, ChipInstanceId, ChipKind, ChipRegistry, Gameweek,
    ParticipantId, PlayerId, Squad, SquadPlayer, FIRST_GAMEWEEK, TRANSFER_POINTS_COST,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Live state for one participant: the squad plus its chip registry.
/// Held behind one lock so transfer and chip read-modify-write
/// sequences cannot interleave.
struct ParticipantState {
    squad: Squad,
    chips: ChipRegistry,
}

/// SquadService owns the live squads and applies every mutation.
pub struct SquadService {
    history: Arc<dyn HistoryBackend>,
    feed: Arc<dyn PlayerFeed>,
    participants: DashMap<ParticipantId, Arc<Mutex<ParticipantState>>>,
}

impl SquadService {
    pub fn new(history: Arc<dyn HistoryBackend>, feed: Arc<dyn PlayerFeed>) -> Self {
        Self { history, feed, participants: DashMap::new() }
    }

    fn state(&self, participant: ParticipantId) -> Result<Arc<Mutex<ParticipantState>>> {
        self.participants
            .get(&participant)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SquadServiceError::SquadNotFound { participant })
    }

    async fn pool_by_id(&self) -> Result<HashMap<PlayerId, FeedPlayer>> {
        let pool = self.feed.player_pool().await?;
        Ok(pool.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Pull current feed prices into the squad where the pool knows
    /// the player; unknown players keep their last price.
    fn refresh_prices(squad: &mut Squad, pool: &HashMap<PlayerId, FeedPlayer>) {
        for entry in &mut squad.players {
            match pool.get(&entry.player_id) {
                Some(player) => entry.current_price = player.now_cost,
                None => warn!(
                    player = %entry.player_id,
                    "player missing from feed pool, price kept"
                ),
            }
        }
        squad.recompute_value();
    }

    /// Build a participant's squad from the external picks feed.
    /// Purchase prices equal current prices: this system has no
    /// ownership history before initialization.
    pub async fn initialize_squad(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> Result<Squad> {
        if !gameweek_in_season(gameweek) {
            return Err(SquadServiceError::GameweekOutOfRange { gameweek });
        }
        if self.participants.contains_key(&participant) {
            return Err(SquadServiceError::SquadAlreadyExists { participant });
        }

        let picks = self.feed.picks(participant, gameweek).await?;
        let pool = self.pool_by_id().await?;
        let mut players = Vec::with_capacity(picks.picks.len());
        for pick in &picks.picks {
            let player = pool
                .get(&pick.player_id)
                .ok_or(FeedError::UnknownPlayer { player_id: pick.player_id })?;
            players.push(SquadPlayer {
                player_id: pick.player_id,
                slot: pick.slot,
                purchase_price: player.now_cost,
                current_price: player.now_cost,
                is_captain: pick.is_captain,
                is_vice_captain: pick.is_vice_captain,
                multiplier: if pick.is_captain { 2 } else { 1 },
            });
        }
        let squad = Squad::new(participant, gameweek, players, picks.bank)?;

        match self.participants.entry(participant) {
            Entry::Occupied(_) => {
                return Err(SquadServiceError::SquadAlreadyExists { participant })
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(ParticipantState {
                    squad: squad.clone(),
                    chips: ChipRegistry::new(),
                })));
            }
        }
        self.history
            .put_snapshot(SquadSnapshot::capture(&squad, SnapshotKind::Regular, picks.points_scored))
            .await?;
        info!(%participant, gameweek, squad_value = %squad.squad_value, "squad initialized");
        Ok(squad)
    }

    pub async fn squad(&self, participant: ParticipantId) -> Result<Squad> {
        let state = self.state(participant)?;
        let state = state.lock().await;
        Ok(state.squad.clone())
    }

    /// Close the current gameweek and enter `new_gameweek`.
    ///
    /// An active free hit is undone first by restoring the roster from
    /// the regular snapshot written when the previous gameweek closed,
    /// so the closing snapshot never records the one-week rental
    /// squad. Then the closing snapshot is written with
    /// `points_scored`, free transfers accrue (idle week banks one, up
    /// to the cap; any activity resets to one) and the weekly counters
    /// reset.
    pub async fn advance_gameweek(
        &self,
        participant: ParticipantId,
        new_gameweek: Gameweek,
        points_scored: i32,
    ) -> Result<Squad> {
        if !gameweek_in_season(new_gameweek) {
            return Err(SquadServiceError::GameweekOutOfRange { gameweek: new_gameweek });
        }
        let state = self.state(participant)?;
        let mut state = state.lock().await;

        // The season only moves forward; a backward or repeated
        // advance would rewrite an already-closed gameweek's snapshot.
        if new_gameweek <= state.squad.gameweek {
            return Err(SquadServiceError::WrongGameweek {
                actual: state.squad.gameweek,
                requested: new_gameweek,
            });
        }

        // All reads up front, before any mutation.
        let revert_to = if state.squad.active_chip == Some(ChipKind::FreeHit)
            && state.squad.gameweek > FIRST_GAMEWEEK
        {
            self.history
                .snapshot(participant, state.squad.gameweek - 1, SnapshotKind::Regular)
                .await?
        } else {
            None
        };
        let pool = self.pool_by_id().await?;

        let squad = &mut state.squad;
        if squad.active_chip == Some(ChipKind::FreeHit) {
            match revert_to {
                Some(snapshot) => {
                    squad.players = snapshot.players;
                    squad.bank = snapshot.bank;
                    squad.recompute_value();
                    info!(
                        %participant,
                        restored_from = snapshot.gameweek,
                        "free hit ended, roster restored"
                    );
                }
                None => warn!(
                    %participant,
                    gameweek = squad.gameweek,
                    "no prior snapshot to restore after free hit, roster kept"
                ),
            }
        }
        Self::refresh_prices(squad, &pool);
        self.history
            .put_snapshot(SquadSnapshot::capture(squad, SnapshotKind::Regular, points_scored))
            .await?;
        squad.accrue_free_transfers();
        squad.roll_into(new_gameweek);
        info!(
            %participant,
            gameweek = new_gameweek,
            free_transfers = squad.free_transfers,
            "gameweek advanced"
        );
        Ok(squad.clone())
    }

    /// Swap one player for another. Validation runs to completion
    /// before the squad is touched; a rejected transfer leaves the
    /// squad exactly as it was.
    pub async fn make_transfer(
        &self,
        participant: ParticipantId,
        player_out: PlayerId,
        player_in: PlayerId,
        gameweek: Gameweek,
    ) -> Result<TransferRecord> {
        let state = self.state(participant)?;
        let mut state = state.lock().await;
        let squad = &mut state.squad;

        if squad.gameweek != gameweek {
            return Err(SquadServiceError::WrongGameweek {
                actual: squad.gameweek,
                requested: gameweek,
            });
        }
        let outgoing = squad
            .player(player_out)
            .cloned()
            .ok_or(squad_core::SquadError::PlayerNotInSquad { player_id: player_out })?;
        if squad.contains(player_in) {
            return Err(squad_core::SquadError::DuplicatePlayer { player_id: player_in }.into());
        }
        let incoming_feed = self.feed.player(player_in).await?;
        let outgoing_feed = self.feed.player(player_out).await?;
        if incoming_feed.position != outgoing_feed.position {
            return Err(SquadServiceError::PositionMismatch {
                outgoing: outgoing_feed.position,
                incoming: incoming_feed.position,
            });
        }

        let sell = selling_price(outgoing.purchase_price, outgoing.current_price);
        let new_bank = squad.bank + sell - incoming_feed.now_cost;
        if new_bank.is_negative() {
            return Err(SquadServiceError::InsufficientFunds { shortfall: new_bank.abs() });
        }
        let chip_unlimited =
            squad.active_chip.is_some_and(|c| c.grants_unlimited_transfers());
        let is_free = chip_unlimited
            || squad.transfers_made_this_week < u32::from(squad.free_transfers);
        let points_cost = if is_free { 0 } else { TRANSFER_POINTS_COST };

        squad.replace_player(player_out, player_in, incoming_feed.now_cost)?;
        squad.bank = new_bank;
        squad.transfers_made_this_week += 1;
        if is_free && !chip_unlimited {
            squad.free_transfers = squad.free_transfers.saturating_sub(1);
        }
        squad.points_deducted += points_cost;
        squad.recompute_value();

        let record = TransferRecord::new(
            participant,
            gameweek,
            TransferIn { player_id: player_in, price: incoming_feed.now_cost },
            TransferOut {
                player_id: player_out,
                purchase_price: outgoing.purchase_price,
                selling_price: sell,
            },
            is_free,
            points_cost,
            squad.active_chip,
        );
        self.history.append_transfer(record.clone()).await?;
        info!(
            %participant,
            gameweek,
            outgoing = %player_out,
            incoming = %player_in,
            is_free,
            points_cost,
            bank = %squad.bank,
            "transfer applied"
        );
        Ok(record)
    }

    /// Chip instances usable in `gameweek`.
    pub async fn available_chips(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> Result<Vec<ChipInstanceId>> {
        let state = self.state(participant)?;
        let state = state.lock().await;
        let last_free_hit = state.chips.last_free_hit();
        Ok(state.chips.list_available(gameweek, last_free_hit))
    }

    /// Activate a chip for the current live gameweek.
    pub async fn activate_chip(
        &self,
        participant: ParticipantId,
        chip: ChipInstanceId,
        gameweek: Gameweek,
    ) -> Result<Squad> {
        let state = self.state(participant)?;
        let mut state = state.lock().await;

        if state.squad.gameweek != gameweek {
            return Err(SquadServiceError::WrongGameweek {
                actual: state.squad.gameweek,
                requested: gameweek,
            });
        }
        if let Some(active) = state.squad.active_chip {
            return Err(SquadServiceError::ChipAlreadyActive { chip: active });
        }
        if chip.kind == ChipKind::FreeHit {
            if let Some(last_used) = state.chips.last_free_hit() {
                if ChipRegistry::free_hit_blocked(gameweek, Some(last_used)) {
                    return Err(SquadServiceError::FreeHitTooSoon {
                        last_used,
                        allowed_from: last_used + squad_core::chips::FREE_HIT_SPACING,
                    });
                }
            }
            // Written before the chip takes effect so the rollover
            // revert has an exact roster to restore.
            self.history
                .put_snapshot(SquadSnapshot::capture(&state.squad, SnapshotKind::PreChip, 0))
                .await?;
        }

        // Consumption failure leaves the squad untouched.
        state.chips.consume(chip, gameweek)?;

        let squad = &mut state.squad;
        squad.active_chip = Some(chip.kind);
        if chip.kind.grants_unlimited_transfers() {
            squad.transfers_made_this_week = 0;
            squad.points_deducted = 0;
        }
        if chip.kind == ChipKind::TripleCaptain {
            if let Some(captain) = squad.captain_mut() {
                captain.multiplier = 3;
            }
        }
        info!(%participant, gameweek, chip = %chip, "chip activated");
        Ok(squad.clone())
    }

    /// Cancel the active chip. Wildcard and free hit are committed
    /// the moment they activate and cannot be taken back.
    pub async fn cancel_chip(&self, participant: ParticipantId) -> Result<Squad> {
        let state = self.state(participant)?;
        let mut state = state.lock().await;

        let chip = state.squad.active_chip.ok_or(SquadServiceError::NoActiveChip)?;
        if !chip.is_cancellable() {
            return Err(SquadServiceError::ChipNotCancellable { chip });
        }
        let gameweek = state.squad.gameweek;
        let restored = state.chips.restore(gameweek)?;

        let squad = &mut state.squad;
        if chip == ChipKind::TripleCaptain {
            if let Some(captain) = squad.captain_mut() {
                captain.multiplier = 2;
            }
        }
        squad.active_chip = None;
        info!(%participant, gameweek, chip = %restored, "chip cancelled");
        Ok(squad.clone())
    }

    /// The regular snapshot for one gameweek.
    pub async fn history_snapshot(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> Result<SquadSnapshot> {
        self.history.snapshot(participant, gameweek, SnapshotKind::Regular).await?.ok_or(
            SquadServiceError::SnapshotNotFound {
                participant,
                gameweek,
                kind: SnapshotKind::Regular.as_str(),
            },
        )
    }

    /// Every snapshot for a participant, ascending by gameweek.
    pub async fn list_history(&self, participant: ParticipantId) -> Result<Vec<SquadSnapshot>> {
        Ok(self.history.snapshots(participant).await?)
    }

    /// Full transfer ledger, newest first.
    pub async fn transfer_history(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<TransferRecord>> {
        let mut records = self.history.transfers(participant).await?;
        records.reverse();
        Ok(records)
    }

    /// Aggregate transfer activity for one gameweek.
    pub async fn transfer_summary(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
    ) -> Result<TransferSummary> {
        let records = self.history.transfers(participant).await?;
        Ok(TransferSummary::from_records(gameweek, &records))
    }
}
