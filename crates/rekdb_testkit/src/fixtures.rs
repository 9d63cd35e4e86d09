//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use chrono::{DateTime, TimeZone, Utc};
use rekdb_core::{Config, Database, ManualClock};
use rekdb_storage::{FileBackend, StorageBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Time every fixture clock starts at: 2024-03-01T10:00:00Z.
#[must_use]
pub fn fixture_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
        .single()
        .expect("valid fixture epoch")
}

/// A test database with a manual clock and automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Arc<Database>,
    /// The clock stamping every write.
    pub clock: Arc<ManualClock>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        Self::memory_with_config(Config::default())
    }

    /// Creates a new in-memory test database with custom configuration.
    pub fn memory_with_config(config: Config) -> Self {
        let db = Database::open_in_memory_with_config(config)
            .expect("Failed to open in-memory database");
        Self::with_clock(db, None)
    }

    /// Creates a new test database over the given backend.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        let db = Database::open(backend, Config::default()).expect("Failed to open database");
        Self::with_clock(db, None)
    }

    /// Creates a new file-based test database.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = FileBackend::open_with_create_dirs(&temp_dir.path().join("rekdb.json"))
            .expect("Failed to create file backend");
        let db = Database::open(Box::new(backend), Config::default())
            .expect("Failed to open file database");
        Self::with_clock(db, Some(temp_dir))
    }

    fn with_clock(db: Database, temp_dir: Option<TempDir>) -> Self {
        let clock = Arc::new(ManualClock::new(fixture_epoch()));
        Self {
            db: Arc::new(db.with_clock(clock.clone())),
            clock,
            _temp_dir: temp_dir,
        }
    }

    /// Returns a shared handle to the database.
    pub fn shared(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    /// Returns the database file path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("rekdb.json"))
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust
/// use rekdb_testkit::with_temp_db;
///
/// with_temp_db(|db| {
///     assert!(db.is_open());
/// });
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use crate::samples::{sample_clients, sample_machines};
    use rekdb_core::{Client, Machine};

    /// Creates a database holding the sample clients under keys 1..=10.
    pub fn seeded_database() -> TestDatabase {
        let test_db = TestDatabase::memory();
        let clients = test_db.db.collection::<Client>();
        for (key, client) in (1..).zip(sample_clients()) {
            clients.add(key, &client).expect("Failed to add client");
        }
        test_db
    }

    /// Creates a seeded database that also holds the sample machines.
    pub fn fleet_database() -> TestDatabase {
        let test_db = seeded_database();
        let machines = test_db.db.collection::<Machine>();
        for (key, machine) in sample_machines() {
            machines.add(key, &machine).expect("Failed to add machine");
        }
        test_db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekdb_core::CLIENTS;

    #[test]
    fn test_memory_database() {
        let test_db = TestDatabase::memory();
        assert!(test_db.path().is_none());
        assert_eq!(test_db.now(), fixture_epoch());
    }

    #[test]
    fn test_with_file_db() {
        with_file_db(|db, path| {
            assert!(!path.exists());
            db.add(
                "expenses",
                rekdb_core::NewRecord::new("e1", serde_json::Map::new()),
            )
            .unwrap();
            assert!(path.exists());
        });
    }

    #[test]
    fn test_seeded_scenario() {
        let test_db = scenarios::seeded_database();
        assert_eq!(test_db.count(CLIENTS).unwrap(), 10);
    }
}
