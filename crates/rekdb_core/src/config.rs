//! Database and backup configuration.

use crate::types::{BACKUPS, CASH_COLLECTIONS, CLIENTS, EXPENSES, MACHINES};
use std::time::Duration;

/// Default interval between scheduled snapshots.
pub const DEFAULT_BACKUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Default number of retained snapshots.
pub const DEFAULT_MAX_BACKUPS: usize = 5;

/// Default product name used in downloadable artifact names.
pub const DEFAULT_PRODUCT_NAME: &str = "rekreativ";

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Collections declared when the database opens.
    pub collections: Vec<String>,

    /// Whether registered entity kinds validate writes to their collections.
    pub enforce_schemas: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collections: [CLIENTS, MACHINES, CASH_COLLECTIONS, EXPENSES, BACKUPS]
                .into_iter()
                .map(String::from)
                .collect(),
            enforce_schemas: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an additional collection at open time.
    #[must_use]
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.collections.contains(&name) {
            self.collections.push(name);
        }
        self
    }

    /// Sets whether writes are validated against registered entity kinds.
    #[must_use]
    pub const fn enforce_schemas(mut self, value: bool) -> Self {
        self.enforce_schemas = value;
        self
    }
}

/// Configuration for the snapshot manager.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Interval between scheduled snapshots.
    pub interval: Duration,

    /// Maximum number of retained snapshots.
    pub max_backups: usize,

    /// Whether `start` takes a snapshot immediately.
    pub snapshot_on_start: bool,

    /// Product name used in artifact file names.
    pub product_name: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_BACKUP_INTERVAL,
            max_backups: DEFAULT_MAX_BACKUPS,
            snapshot_on_start: true,
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
        }
    }
}

impl BackupConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheduled snapshot interval.
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the number of retained snapshots (at least one is always kept).
    #[must_use]
    pub const fn max_backups(mut self, count: usize) -> Self {
        self.max_backups = if count == 0 { 1 } else { count };
        self
    }

    /// Sets whether `start` snapshots immediately.
    #[must_use]
    pub const fn snapshot_on_start(mut self, value: bool) -> Self {
        self.snapshot_on_start = value;
        self
    }

    /// Sets the product name used in artifact file names.
    #[must_use]
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }
}
