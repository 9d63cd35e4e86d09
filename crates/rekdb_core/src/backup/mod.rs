//! Point-in-time snapshots of the store.
//!
//! Snapshots are records of the `backups` collection holding the encoded
//! export document of the store at the time they were taken, plus metadata.
//! They are never modified; retention eviction is the only way they leave.
//!
//! ## Snapshot record
//!
//! ```text
//! { id: "backup_<epochMillis>", data: "<export document>",
//!   metadata: { timestamp, size, version }, createdAt, updatedAt }
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rekdb_core::{BackupConfig, BackupManager, Database};
//! use std::sync::Arc;
//!
//! let db = Arc::new(Database::open_in_memory().unwrap());
//! let backups = BackupManager::new(Arc::clone(&db), BackupConfig::default());
//!
//! let id = backups.snapshot_now().unwrap();
//! assert_eq!(backups.list().unwrap()[0].id, id);
//! backups.restore(&id).unwrap();
//! ```

mod manager;
mod scheduler;

pub use manager::{Artifact, BackupManager, SchedulerStats, Snapshot, SnapshotId};
pub(crate) use manager::summarize;
