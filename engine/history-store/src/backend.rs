//! History backend trait and implementations

use crate::config::HistoryConfig;
use crate::error::{HistoryError, Result};
use crate::ledger::TransferRecord;
use crate::snapshot::{SnapshotKind, SquadSnapshot};
use squad_core::{Gameweek, ParticipantId};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Abstract trait for history storage backends.
///
/// Snapshot writes use put semantics: at most one snapshot exists per
/// (participant, gameweek, kind) and a rewrite of the same key
/// replaces it (the end-of-gameweek record supersedes the
/// initialization record for the same gameweek). The transfer ledger
/// is strictly append-only.
#[async_trait::async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Store a snapshot, replacing any existing snapshot with the
    /// same (participant, gameweek, kind).
    async fn put_snapshot(&self, snapshot: SquadSnapshot) -> Result<()>;

    /// Load one snapshot by key.
    async fn snapshot(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
        kind: SnapshotKind,
    ) -> Result<Option<SquadSnapshot>>;

    /// All snapshots for a participant, ascending by gameweek.
    async fn snapshots(&self, participant: ParticipantId) -> Result<Vec<SquadSnapshot>>;

    /// Regular snapshots for a participant, descending by gameweek
    /// (the scan order of the price resolver).
    async fn regular_snapshots_desc(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<SquadSnapshot>>;

    /// Append a ledger entry, returning its sequence number.
    async fn append_transfer(&self, record: TransferRecord) -> Result<u64>;

    /// The full ledger for a participant in append order.
    async fn transfers(&self, participant: ParticipantId) -> Result<Vec<TransferRecord>>;
}

fn sort_ascending(snapshots: &mut [SquadSnapshot]) {
    snapshots.sort_by_key(|s| (s.gameweek, s.kind.as_str()));
}

/// In-memory history backend.
#[derive(Default)]
struct ParticipantHistory {
    snapshots: HashMap<(Gameweek, SnapshotKind), SquadSnapshot>,
    transfers: Vec<TransferRecord>,
}

/// In-memory backend used by tests and by deployments that rebuild
/// state from the feed on startup.
pub struct InMemoryHistory {
    participants: Arc<Mutex<HashMap<ParticipantId, ParticipantHistory>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self { participants: Arc::new(Mutex::new(HashMap::new())) }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HistoryBackend for InMemoryHistory {
    async fn put_snapshot(&self, snapshot: SquadSnapshot) -> Result<()> {
        let mut participants = self.participants.lock().await;
        let history = participants.entry(snapshot.participant_id).or_default();
        history.snapshots.insert((snapshot.gameweek, snapshot.kind), snapshot);
        Ok(())
    }

    async fn snapshot(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
        kind: SnapshotKind,
    ) -> Result<Option<SquadSnapshot>> {
        let participants = self.participants.lock().await;
        Ok(participants
            .get(&participant)
            .and_then(|h| h.snapshots.get(&(gameweek, kind)))
            .cloned())
    }

    async fn snapshots(&self, participant: ParticipantId) -> Result<Vec<SquadSnapshot>> {
        let participants = self.participants.lock().await;
        let mut snapshots: Vec<SquadSnapshot> = participants
            .get(&participant)
            .map(|h| h.snapshots.values().cloned().collect())
            .unwrap_or_default();
        sort_ascending(&mut snapshots);
        Ok(snapshots)
    }

    async fn regular_snapshots_desc(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<SquadSnapshot>> {
        let mut snapshots = self.snapshots(participant).await?;
        snapshots.retain(|s| s.kind == SnapshotKind::Regular);
        snapshots.reverse();
        Ok(snapshots)
    }

    async fn append_transfer(&self, record: TransferRecord) -> Result<u64> {
        let mut participants = self.participants.lock().await;
        let history = participants.entry(record.participant_id).or_default();
        history.transfers.push(record);
        Ok(history.transfers.len() as u64)
    }

    async fn transfers(&self, participant: ParticipantId) -> Result<Vec<TransferRecord>> {
        let participants = self.participants.lock().await;
        Ok(participants.get(&participant).map(|h| h.transfers.clone()).unwrap_or_default())
    }
}

/// Local file backend: one JSON file per snapshot and a JSON-lines
/// ledger file, under a directory per participant.
pub struct LocalHistory {
    config: HistoryConfig,
    // Serializes ledger appends and tracks the next sequence number
    // per participant, seeded from the file on first touch. Snapshot
    // writes are whole-file replaces and need no cross-write ordering.
    ledger_seq: Mutex<HashMap<ParticipantId, u64>>,
}

impl LocalHistory {
    pub fn new(config: HistoryConfig) -> Result<Self> {
        config.validate().map_err(HistoryError::invalid_operation)?;
        std::fs::create_dir_all(config.participants_dir())?;
        tracing::info!(dir = ?config.data_dir, "local history backend initialized");
        Ok(Self { config, ledger_seq: Mutex::new(HashMap::new()) })
    }

    fn participant_dir(&self, participant: ParticipantId) -> PathBuf {
        self.config.participants_dir().join(participant.0.to_string())
    }

    fn snapshots_dir(&self, participant: ParticipantId) -> PathBuf {
        self.participant_dir(participant).join("snapshots")
    }

    fn snapshot_path(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
        kind: SnapshotKind,
    ) -> PathBuf {
        self.snapshots_dir(participant).join(format!("gw{gameweek:02}_{kind}.json"))
    }

    fn ledger_path(&self, participant: ParticipantId) -> PathBuf {
        self.participant_dir(participant).join("transfers.jsonl")
    }

    fn write_json(&self, path: &PathBuf, snapshot: &SquadSnapshot) -> Result<()> {
        let file = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
        let mut writer = BufWriter::new(file);
        if self.config.pretty_json {
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
        } else {
            serde_json::to_writer(&mut writer, snapshot)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_all_snapshots(&self, participant: ParticipantId) -> Result<Vec<SquadSnapshot>> {
        let dir = self.snapshots_dir(participant);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut snapshots = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let file = File::open(&path)?;
            let snapshot: SquadSnapshot = serde_json::from_reader(BufReader::new(file))
                .map_err(|e| HistoryError::corruption(format!("{}: {e}", path.display())))?;
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }
}

#[async_trait::async_trait]
impl HistoryBackend for LocalHistory {
    async fn put_snapshot(&self, snapshot: SquadSnapshot) -> Result<()> {
        std::fs::create_dir_all(self.snapshots_dir(snapshot.participant_id))?;
        let path = self.snapshot_path(snapshot.participant_id, snapshot.gameweek, snapshot.kind);
        self.write_json(&path, &snapshot)?;
        tracing::debug!(
            participant = %snapshot.participant_id,
            gameweek = snapshot.gameweek,
            kind = %snapshot.kind,
            "snapshot written"
        );
        Ok(())
    }

    async fn snapshot(
        &self,
        participant: ParticipantId,
        gameweek: Gameweek,
        kind: SnapshotKind,
    ) -> Result<Option<SquadSnapshot>> {
        let path = self.snapshot_path(participant, gameweek, kind);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path)?;
        let snapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| HistoryError::corruption(format!("{}: {e}", path.display())))?;
        Ok(Some(snapshot))
    }

    async fn snapshots(&self, participant: ParticipantId) -> Result<Vec<SquadSnapshot>> {
        let mut snapshots = self.read_all_snapshots(participant)?;
        sort_ascending(&mut snapshots);
        Ok(snapshots)
    }

    async fn regular_snapshots_desc(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<SquadSnapshot>> {
        let mut snapshots = self.read_all_snapshots(participant)?;
        snapshots.retain(|s| s.kind == SnapshotKind::Regular);
        sort_ascending(&mut snapshots);
        snapshots.reverse();
        Ok(snapshots)
    }

    async fn append_transfer(&self, record: TransferRecord) -> Result<u64> {
        let participant = record.participant_id;
        let mut sequences = self.ledger_seq.lock().await;
        std::fs::create_dir_all(self.participant_dir(participant))?;
        let path = self.ledger_path(participant);
        let current = match sequences.get(&participant) {
            Some(&count) => count,
            // First append through this instance: resume from
            // whatever an earlier process left in the file.
            None if path.exists() => {
                BufReader::new(File::open(&path)?).lines().count() as u64
            }
            None => 0,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        let sequence = current + 1;
        sequences.insert(participant, sequence);
        Ok(sequence)
    }

    async fn transfers(&self, participant: ParticipantId) -> Result<Vec<TransferRecord>> {
        let path = self.ledger_path(participant);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path)?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TransferRecord = serde_json::from_str(&line)
                .map_err(|e| HistoryError::corruption(format!("{}: {e}", path.display())))?;
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{TransferIn, TransferOut};
    use squad_core::{PlayerId, Price, Squad, SquadPlayer};

    fn squad(participant: i64, gameweek: Gameweek) -> Squad {
        let players = (1..=15)
            .map(|s| SquadPlayer {
                player_id: PlayerId(s as u32),
                slot: s,
                purchase_price: Price::from_tenths(50),
                current_price: Price::from_tenths(50),
                is_captain: s == 1,
                is_vice_captain: s == 2,
                multiplier: if s == 1 { 2 } else { 1 },
            })
            .collect();
        Squad::new(ParticipantId(participant), gameweek, players, Price::from_tenths(0)).unwrap()
    }

    fn record(participant: i64, gameweek: Gameweek) -> TransferRecord {
        TransferRecord::new(
            ParticipantId(participant),
            gameweek,
            TransferIn { player_id: PlayerId(20), price: Price::from_tenths(70) },
            TransferOut {
                player_id: PlayerId(3),
                purchase_price: Price::from_tenths(50),
                selling_price: Price::from_tenths(52),
            },
            true,
            0,
            None,
        )
    }

    #[tokio::test]
    async fn in_memory_put_replaces_same_key() {
        let store = InMemoryHistory::new();
        let s = squad(1, 5);
        store.put_snapshot(SquadSnapshot::capture(&s, SnapshotKind::Regular, 0)).await.unwrap();
        store.put_snapshot(SquadSnapshot::capture(&s, SnapshotKind::Regular, 42)).await.unwrap();

        let all = store.snapshots(ParticipantId(1)).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].points_scored, 42);
    }

    #[tokio::test]
    async fn in_memory_pre_chip_coexists_with_regular() {
        let store = InMemoryHistory::new();
        let s = squad(1, 5);
        store.put_snapshot(SquadSnapshot::capture(&s, SnapshotKind::Regular, 0)).await.unwrap();
        store.put_snapshot(SquadSnapshot::capture(&s, SnapshotKind::PreChip, 0)).await.unwrap();

        assert_eq!(store.snapshots(ParticipantId(1)).await.unwrap().len(), 2);
        assert_eq!(store.regular_snapshots_desc(ParticipantId(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn regular_snapshots_come_back_descending() {
        let store = InMemoryHistory::new();
        for gw in [3u8, 1, 2] {
            let s = squad(1, gw);
            store
                .put_snapshot(SquadSnapshot::capture(&s, SnapshotKind::Regular, 0))
                .await
                .unwrap();
        }
        let desc = store.regular_snapshots_desc(ParticipantId(1)).await.unwrap();
        let gameweeks: Vec<Gameweek> = desc.iter().map(|s| s.gameweek).collect();
        assert_eq!(gameweeks, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn local_round_trips_snapshots_and_ledger() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalHistory::new(HistoryConfig::new(dir.path())).unwrap();

        let s = squad(7, 4);
        let snap = SquadSnapshot::capture(&s, SnapshotKind::Regular, 55);
        store.put_snapshot(snap.clone()).await.unwrap();

        let loaded = store
            .snapshot(ParticipantId(7), 4, SnapshotKind::Regular)
            .await
            .unwrap()
            .expect("snapshot present");
        assert_eq!(loaded, snap);
        assert!(store
            .snapshot(ParticipantId(7), 4, SnapshotKind::PreChip)
            .await
            .unwrap()
            .is_none());

        let seq1 = store.append_transfer(record(7, 4)).await.unwrap();
        let seq2 = store.append_transfer(record(7, 5)).await.unwrap();
        assert_eq!((seq1, seq2), (1, 2));

        let transfers = store.transfers(ParticipantId(7)).await.unwrap();
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].gameweek, 4);
        assert_eq!(transfers[1].gameweek, 5);
    }

    #[tokio::test]
    async fn local_ledger_sequence_resumes_after_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalHistory::new(HistoryConfig::new(dir.path())).unwrap();
        assert_eq!(store.append_transfer(record(7, 1)).await.unwrap(), 1);
        assert_eq!(store.append_transfer(record(7, 2)).await.unwrap(), 2);
        drop(store);

        let store = LocalHistory::new(HistoryConfig::new(dir.path())).unwrap();
        assert_eq!(store.append_transfer(record(7, 3)).await.unwrap(), 3);
        assert_eq!(store.transfers(ParticipantId(7)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn local_isolates_participants() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalHistory::new(HistoryConfig::new(dir.path())).unwrap();

        store.append_transfer(record(1, 2)).await.unwrap();
        assert!(store.transfers(ParticipantId(2)).await.unwrap().is_empty());
        assert!(store.snapshots(ParticipantId(2)).await.unwrap().is_empty());
    }
}
