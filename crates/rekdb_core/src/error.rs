//! Error types for rekdb core.

use crate::types::Key;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in rekdb core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] rekdb_storage::StorageError),

    /// Codec error (malformed or incompatible document).
    #[error("codec error: {0}")]
    Codec(#[from] rekdb_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Entity not found.
    #[error("entity not found: {key} in collection {collection}")]
    NotFound {
        /// The collection searched.
        collection: String,
        /// The key that was not found.
        key: Key,
    },

    /// An entity with the same key already exists.
    #[error("duplicate key: {key} already exists in collection {collection}")]
    DuplicateKey {
        /// The collection written to.
        collection: String,
        /// The conflicting key.
        key: Key,
    },

    /// A schema rule or transaction precondition was violated.
    #[error("validation failed: {message}")]
    ValidationFailed {
        /// Actionable description of the violation.
        message: String,
    },

    /// Transaction was aborted; nothing it wrote is visible.
    #[error("transaction aborted: {cause}")]
    TransactionAborted {
        /// The error that aborted the transaction.
        #[source]
        cause: Box<CoreError>,
    },

    /// No snapshot with the given id exists.
    #[error("snapshot not found: {id}")]
    SnapshotNotFound {
        /// The requested snapshot id.
        id: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// Database is closed.
    #[error("database is closed")]
    DatabaseClosed,
}

impl CoreError {
    /// Creates a not found error.
    pub fn not_found(collection: impl Into<String>, key: Key) -> Self {
        Self::NotFound {
            collection: collection.into(),
            key,
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(collection: impl Into<String>, key: Key) -> Self {
        Self::DuplicateKey {
            collection: collection.into(),
            key,
        }
    }

    /// Creates a validation failed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Wraps an error as the cause of an aborted transaction.
    pub fn transaction_aborted(cause: CoreError) -> Self {
        Self::TransactionAborted {
            cause: Box::new(cause),
        }
    }

    /// Creates a snapshot not found error.
    pub fn snapshot_not_found(id: impl Into<String>) -> Self {
        Self::SnapshotNotFound { id: id.into() }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns the innermost error, looking through aborted transactions.
    #[must_use]
    pub fn root_cause(&self) -> &CoreError {
        match self {
            Self::TransactionAborted { cause } => cause.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_nested_aborts() {
        let err = CoreError::transaction_aborted(CoreError::transaction_aborted(
            CoreError::not_found("machines", Key::from("M1")),
        ));
        assert!(matches!(err.root_cause(), CoreError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "transaction aborted: transaction aborted: entity not found: M1 in collection machines"
        );
    }

    #[test]
    fn validation_message_is_actionable() {
        let err = CoreError::validation_failed("specify both split-schedule times or neither");
        assert_eq!(
            err.to_string(),
            "validation failed: specify both split-schedule times or neither"
        );
    }
}
