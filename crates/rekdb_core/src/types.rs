//! Core type definitions for rekdb.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Collection holding clients.
pub const CLIENTS: &str = "clients";
/// Collection holding machines.
pub const MACHINES: &str = "machines";
/// Collection holding cash collections.
pub const CASH_COLLECTIONS: &str = "collections";
/// Collection holding expenses.
pub const EXPENSES: &str = "expenses";
/// Collection holding snapshots.
pub const BACKUPS: &str = "backups";

/// Unique key of an entity within its collection.
///
/// Keys are either integers (sequentially assigned) or strings
/// (generated), depending on the collection. They serialize as plain JSON
/// numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key.
    Text(String),
}

impl Key {
    /// Generates a fresh random string key.
    #[must_use]
    pub fn generate() -> Self {
        Self::Text(Uuid::new_v4().simple().to_string())
    }

    /// Returns the integer value, if this is an integer key.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Returns the string value, if this is a string key.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
