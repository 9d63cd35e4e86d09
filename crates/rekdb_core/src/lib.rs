//! # rekdb Core
//!
//! Embedded transactional record store for rekdb.
//!
//! This crate provides:
//! - A record store of named, insertion-ordered collections
//! - Multi-collection transactions with all-or-nothing visibility
//! - Typed entity kinds with a schema boundary at every write
//! - Snapshots with a retention policy, a periodic schedule and restore
//! - Per-kind request tracking for asynchronous consumers
//!
//! ## Example
//!
//! ```rust
//! use rekdb_core::{CashReading, Database, Key, Machine};
//!
//! let db = Database::open_in_memory().unwrap();
//! let machine = Machine {
//!     serial_number: "SN-001".into(),
//!     current_counter: 1_000,
//!     ..Machine::default()
//! };
//! db.collection::<Machine>().add("M1", &machine).unwrap();
//!
//! let key = Key::from("M1");
//! db.record_cash_collection(&key, CashReading::new(85.0, 1_250)).unwrap();
//!
//! let machine = db.collection::<Machine>().get(&key).unwrap();
//! assert_eq!(machine.body.current_counter, 1_250);
//! assert_eq!(machine.body.history.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod clock;
mod collection;
mod config;
mod database;
mod domain;
mod entity;
mod error;
mod operations;
mod tracker;
mod transaction;
mod types;

pub use backup::{Artifact, BackupManager, SchedulerStats, Snapshot, SnapshotId};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::{Collection, Entity, EntityKind, KeyStrategy, KindSchema, Schema, SchemaRegistry};
pub use config::{BackupConfig, Config, DEFAULT_BACKUP_INTERVAL, DEFAULT_MAX_BACKUPS, DEFAULT_PRODUCT_NAME};
pub use database::Database;
pub use domain::{
    domain_schemas, CashCollection, CashReading, Client, HistoryAction, HistoryEntry, Installation,
    Machine, MachineStatus,
};
pub use entity::{Attributes, NewRecord, Patch, Record, RecordStore, RESERVED_FIELDS};
pub use error::{CoreError, CoreResult};
pub use tracker::{EntityTracker, RequestState, RequestStatus};
pub use transaction::{Operation, PendingWrite, Transaction};
pub use types::{Key, BACKUPS, CASH_COLLECTIONS, CLIENTS, EXPENSES, MACHINES};

pub use rekdb_codec::{BackupMetadata, BackupSummary, ExportDocument};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
