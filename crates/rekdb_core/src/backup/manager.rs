//! Snapshot creation, retention, restore and download.

use crate::collection::EntityKind;
use crate::collection::KeyStrategy;
use crate::config::BackupConfig;
use crate::database::Database;
use crate::entity::{NewRecord, Record};
use crate::error::{CoreError, CoreResult};
use crate::transaction::Transaction;
use crate::types::{Key, BACKUPS};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rekdb_codec::{
    artifact_name, decode_document, encode_document, BackupMetadata, BackupSummary, CodecError,
    ExportDocument, FORMAT_VERSION,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::scheduler::Schedule;

/// Identifier of a snapshot (`backup_<epochMillis>`).
pub type SnapshotId = String;

/// Body of a snapshot record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Encoded export document.
    pub data: String,
    /// Snapshot metadata.
    pub metadata: BackupMetadata,
}

impl EntityKind for Snapshot {
    const COLLECTION: &'static str = BACKUPS;
    const KEYS: KeyStrategy = KeyStrategy::Generated;
}

/// A downloadable snapshot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name, `<product>_backup_<isoTimestamp>.json`.
    pub file_name: String,
    /// The export document.
    pub contents: Vec<u8>,
}

impl Artifact {
    /// Writes the artifact into `dir` under its file name.
    pub fn write_into(&self, dir: &Path) -> CoreResult<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// Counters kept by the snapshot schedule.
///
/// Only startup and scheduled cycles are counted; on-demand snapshots
/// report their outcome to the caller instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Cycles that produced a snapshot.
    pub cycles_completed: u64,
    /// Cycles that failed.
    pub cycles_failed: u64,
    /// Id of the last snapshot a cycle produced.
    pub last_snapshot: Option<SnapshotId>,
    /// Error of the last failed cycle.
    pub last_error: Option<String>,
}

/// Why a cycle ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CycleTrigger {
    Startup,
    Scheduled,
}

/// Creates, retains and restores snapshots.
///
/// Every cycle (scheduled or on demand) and every restore holds the
/// manager's cycle lock, so they never overlap.
pub struct BackupManager {
    pub(crate) inner: Arc<BackupInner>,
    pub(crate) schedule: Mutex<Option<Schedule>>,
}

pub(crate) struct BackupInner {
    db: Arc<Database>,
    pub(crate) config: BackupConfig,
    pub(crate) cycle_lock: Mutex<()>,
    stats: RwLock<SchedulerStats>,
}

impl BackupManager {
    /// Creates a manager over a database.
    pub fn new(db: Arc<Database>, config: BackupConfig) -> Self {
        Self {
            inner: Arc::new(BackupInner {
                db,
                config,
                cycle_lock: Mutex::new(()),
                stats: RwLock::new(SchedulerStats::default()),
            }),
            schedule: Mutex::new(None),
        }
    }

    /// Creates a manager with default configuration.
    pub fn with_defaults(db: Arc<Database>) -> Self {
        Self::new(db, BackupConfig::default())
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BackupConfig {
        &self.inner.config
    }

    /// Returns the schedule counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.inner.stats.read().clone()
    }

    /// Takes a snapshot now, outside the schedule.
    ///
    /// Runs retention afterwards; the new snapshot is never evicted.
    pub fn snapshot_now(&self) -> CoreResult<SnapshotId> {
        let _cycle = self.inner.cycle_lock.lock();
        self.inner.snapshot()
    }

    /// Replaces every collection covered by the snapshot with its content.
    ///
    /// The snapshot is decoded completely before the store changes.
    ///
    /// # Errors
    ///
    /// `SnapshotNotFound` if no snapshot has this id; a codec error if its
    /// data does not decode, in which case the store is untouched.
    pub fn restore(&self, id: &str) -> CoreResult<()> {
        let _cycle = self.inner.cycle_lock.lock();
        let snapshot = self.inner.load(id)?;
        let document: ExportDocument<Record> = decode_document(snapshot.data.as_bytes())?;
        let replaced = self.inner.db.replace_collections(document.collections)?;
        info!(id, collections = replaced, "snapshot restored");
        Ok(())
    }

    /// Lists snapshot summaries, newest first.
    pub fn list(&self) -> CoreResult<Vec<BackupSummary>> {
        let mut summaries: Vec<(usize, BackupSummary)> = self
            .inner
            .db
            .get_all(BACKUPS)?
            .iter()
            .filter_map(summarize)
            .enumerate()
            .collect();
        summaries.sort_by(|(a_pos, a), (b_pos, b)| {
            b.metadata
                .timestamp
                .cmp(&a.metadata.timestamp)
                .then(b_pos.cmp(a_pos))
        });
        Ok(summaries.into_iter().map(|(_, summary)| summary).collect())
    }

    /// Returns a snapshot as a downloadable file.
    pub fn download(&self, id: &str) -> CoreResult<Artifact> {
        let snapshot = self.inner.load(id)?;
        decode_document::<serde_json::Value>(snapshot.data.as_bytes())?;
        Ok(Artifact {
            file_name: artifact_name(&self.inner.config.product_name, snapshot.metadata.timestamp),
            contents: snapshot.data.into_bytes(),
        })
    }
}

impl BackupInner {
    /// Runs one counted cycle. The caller holds the cycle lock.
    pub(crate) fn run_cycle(&self, trigger: CycleTrigger) {
        match self.snapshot() {
            Ok(id) => {
                let mut stats = self.stats.write();
                stats.cycles_completed += 1;
                stats.last_snapshot = Some(id);
            }
            Err(e) => {
                error!(error = %e, ?trigger, "backup cycle failed");
                let mut stats = self.stats.write();
                stats.cycles_failed += 1;
                stats.last_error = Some(e.to_string());
            }
        }
    }

    /// Exports, stores and sweeps. The caller holds the cycle lock.
    fn snapshot(&self) -> CoreResult<SnapshotId> {
        let document = self.db.export_document()?;
        let data = String::from_utf8(encode_document(&document)?)
            .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
        let metadata = BackupMetadata {
            timestamp: self.db.now(),
            size: data.len() as u64,
            version: FORMAT_VERSION.to_string(),
        };
        let base_id = format!("backup_{}", metadata.timestamp.timestamp_millis());
        let size = metadata.size;
        let max_backups = self.config.max_backups;

        let (id, evicted) = self.db.transaction(&[BACKUPS], |txn| {
            let id = unique_id(txn, &base_id)?;
            let snapshot = Snapshot { data, metadata };
            txn.add(BACKUPS, NewRecord::from_body(id.as_str(), &snapshot)?)?;
            let evicted = sweep(txn, &id, max_backups)?;
            Ok((id, evicted))
        })?;

        for key in &evicted {
            info!(id = %key, "snapshot evicted");
        }
        info!(id = %id, size, "snapshot created");
        Ok(id)
    }

    fn load(&self, id: &str) -> CoreResult<Snapshot> {
        let record = match self.db.get(BACKUPS, &Key::from(id)) {
            Ok(record) => record,
            Err(CoreError::NotFound { .. }) => return Err(CoreError::snapshot_not_found(id)),
            Err(e) => return Err(e),
        };
        Snapshot::from_record(&record)
    }
}

/// Summarizes a snapshot record, skipping records that are not snapshots.
pub(crate) fn summarize(record: &Record) -> Option<BackupSummary> {
    match record.get("metadata").cloned().map(serde_json::from_value) {
        Some(Ok(metadata)) => Some(BackupSummary {
            id: record.key().to_string(),
            metadata,
            created_at: record.created_at(),
        }),
        _ => {
            warn!(id = %record.key(), "skipping backup record without metadata");
            None
        }
    }
}

fn unique_id(txn: &Transaction<'_>, base: &str) -> CoreResult<SnapshotId> {
    if txn.find(BACKUPS, &Key::from(base))?.is_none() {
        return Ok(base.to_string());
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{base}_{suffix}");
        if txn.find(BACKUPS, &Key::from(candidate.as_str()))?.is_none() {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

/// Deletes the oldest snapshots beyond `max_backups`, never `keep`.
fn sweep(txn: &mut Transaction<'_>, keep: &str, max_backups: usize) -> CoreResult<Vec<Key>> {
    let backups = txn.list(BACKUPS)?;
    if backups.len() <= max_backups {
        return Ok(Vec::new());
    }
    let excess = backups.len() - max_backups;

    let mut candidates: Vec<(DateTime<Utc>, usize, Key)> = backups
        .iter()
        .enumerate()
        .filter(|(_, record)| record.key().as_str() != Some(keep))
        .map(|(position, record)| (snapshot_time(record), position, record.key().clone()))
        .collect();
    candidates.sort();

    let evicted: Vec<Key> = candidates
        .into_iter()
        .take(excess)
        .map(|(_, _, key)| key)
        .collect();
    for key in &evicted {
        txn.delete(BACKUPS, key)?;
    }
    Ok(evicted)
}

fn snapshot_time(record: &Record) -> DateTime<Utc> {
    record
        .get("metadata")
        .and_then(|m| m.get("timestamp"))
        .and_then(|t| serde_json::from_value(t.clone()).ok())
        .unwrap_or_else(|| record.created_at())
}

impl Drop for BackupManager {
    fn drop(&mut self) {
        self.cancel_schedule();
    }
}
