//! Declarative transaction operations.

use crate::entity::{NewRecord, Patch};
use crate::types::Key;

/// One step of a transaction run with
/// [`Database::run_transaction`](crate::Database::run_transaction).
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Insert a record; fails if the key exists.
    Add {
        /// Target collection.
        collection: String,
        /// Record to insert.
        record: NewRecord,
    },
    /// Merge-upsert a record.
    Put {
        /// Target collection.
        collection: String,
        /// Fields to merge.
        patch: Patch,
    },
    /// Delete a record; absent keys are ignored.
    Delete {
        /// Target collection.
        collection: String,
        /// Key to delete.
        key: Key,
    },
    /// Assert that a record exists.
    Require {
        /// Collection to check.
        collection: String,
        /// Key that must be present.
        key: Key,
    },
}

impl Operation {
    /// Creates an add operation.
    pub fn add(collection: impl Into<String>, record: NewRecord) -> Self {
        Self::Add {
            collection: collection.into(),
            record,
        }
    }

    /// Creates a put operation.
    pub fn put(collection: impl Into<String>, patch: Patch) -> Self {
        Self::Put {
            collection: collection.into(),
            patch,
        }
    }

    /// Creates a delete operation.
    pub fn delete(collection: impl Into<String>, key: impl Into<Key>) -> Self {
        Self::Delete {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Creates a require operation.
    pub fn require(collection: impl Into<String>, key: impl Into<Key>) -> Self {
        Self::Require {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Returns the collection this operation touches.
    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Self::Add { collection, .. }
            | Self::Put { collection, .. }
            | Self::Delete { collection, .. }
            | Self::Require { collection, .. } => collection,
        }
    }
}
