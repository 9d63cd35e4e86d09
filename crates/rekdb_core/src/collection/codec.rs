//! Entity kind trait for typed collections.

use crate::entity::Record;
use crate::error::{CoreError, CoreResult};
use crate::types::Key;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// How new keys are assigned for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Sequential integers.
    Sequential,
    /// Generated random strings.
    Generated,
}

/// A typed entity kind stored in a fixed collection.
///
/// The body is serialized as the record's attribute payload with
/// camelCase field names.
///
/// # Example
///
/// ```rust
/// use rekdb_core::{CoreError, CoreResult, EntityKind, KeyStrategy};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Expense {
///     concept: String,
///     amount: f64,
/// }
///
/// impl EntityKind for Expense {
///     const COLLECTION: &'static str = "expenses";
///     const KEYS: KeyStrategy = KeyStrategy::Generated;
///
///     fn validate(&self) -> CoreResult<()> {
///         if self.amount < 0.0 {
///             return Err(CoreError::validation_failed("expense amount must not be negative"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait EntityKind: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection holding entities of this kind.
    const COLLECTION: &'static str;

    /// Key assignment for new entities.
    const KEYS: KeyStrategy;

    /// Checks rules that apply to a single entity state.
    fn validate(&self) -> CoreResult<()> {
        Ok(())
    }

    /// Checks rules that relate an update to the previous state.
    fn check_transition(previous: &Self, next: &Self) -> CoreResult<()> {
        let _ = (previous, next);
        Ok(())
    }

    /// Decodes a body from a record's attributes.
    fn from_record(record: &Record) -> CoreResult<Self> {
        serde_json::from_value(serde_json::Value::Object(record.attributes().clone())).map_err(
            |e| {
                CoreError::validation_failed(format!(
                    "{} {}: {e}",
                    Self::COLLECTION,
                    record.key()
                ))
            },
        )
    }
}

/// A decoded entity: key, typed body and lifecycle timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity<K> {
    /// Entity key.
    pub id: Key,
    /// Typed body.
    #[serde(flatten)]
    pub body: K,
    /// When the entity was created.
    pub created_at: DateTime<Utc>,
    /// When the entity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl<K: EntityKind> Entity<K> {
    /// Decodes an entity from a stored record.
    pub fn from_record(record: &Record) -> CoreResult<Self> {
        Ok(Self {
            id: record.key().clone(),
            body: K::from_record(record)?,
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        })
    }
}
