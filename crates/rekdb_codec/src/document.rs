//! Document types.

use crate::FORMAT_VERSION;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn legacy_version() -> String {
    FORMAT_VERSION.to_string()
}

/// Metadata stored alongside every backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Size of the encoded export in bytes.
    pub size: u64,
    /// Format version of the encoded export.
    pub version: String,
}

/// Metadata-only view of a backup record, as nested in an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSummary {
    /// Backup identifier (`backup_<epochMillis>`).
    pub id: String,
    /// Backup metadata.
    pub metadata: BackupMetadata,
    /// When the backup record was created.
    pub created_at: DateTime<Utc>,
}

/// The export document.
///
/// Serialized as a flat JSON object: one array per domain collection, a
/// `version` tag and a `backupsMetadata` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<E> {
    /// Format version tag.
    #[serde(default = "legacy_version")]
    pub version: String,
    /// Domain collections, in store order.
    #[serde(flatten)]
    pub collections: IndexMap<String, Vec<E>>,
    /// Metadata of the backups present at export time.
    #[serde(default)]
    pub backups_metadata: Vec<BackupSummary>,
}

impl<E> ExportDocument<E> {
    /// Creates an empty document tagged with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: legacy_version(),
            collections: IndexMap::new(),
            backups_metadata: Vec::new(),
        }
    }

    /// Adds (or replaces) a collection.
    pub fn insert_collection(&mut self, name: impl Into<String>, entities: Vec<E>) {
        self.collections.insert(name.into(), entities);
    }

    /// Returns the entities of a collection, if present in the document.
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&[E]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    /// Total number of entities across all collections.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }
}

impl<E> Default for ExportDocument<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Full store image handed to the storage backend.
///
/// Unlike [`ExportDocument`] this holds every collection verbatim,
/// including backup payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreImage<E> {
    /// Format version tag.
    #[serde(default = "legacy_version")]
    pub version: String,
    /// Every collection, in store order.
    pub collections: IndexMap<String, Vec<E>>,
}

impl<E> StoreImage<E> {
    /// Creates an image from collections.
    #[must_use]
    pub fn new(collections: IndexMap<String, Vec<E>>) -> Self {
        Self {
            version: legacy_version(),
            collections,
        }
    }
}
