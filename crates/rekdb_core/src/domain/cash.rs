//! Cash collections taken from machines.

use crate::collection::{EntityKind, KeyStrategy};
use crate::error::{CoreError, CoreResult};
use crate::types::{Key, CASH_COLLECTIONS};
use serde::{Deserialize, Serialize};

/// Cash collected from a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashCollection {
    /// Machine the cash came from.
    pub machine_id: Key,
    /// Client the machine was installed at.
    #[serde(default)]
    pub client_id: Option<Key>,
    /// Amount collected.
    pub amount: f64,
    /// Machine counter before this collection.
    pub previous_counter: u64,
    /// Machine counter observed at collection time.
    pub current_counter: u64,
    /// Collecting technician.
    #[serde(default)]
    pub technician: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl EntityKind for CashCollection {
    const COLLECTION: &'static str = CASH_COLLECTIONS;
    const KEYS: KeyStrategy = KeyStrategy::Generated;

    fn validate(&self) -> CoreResult<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(CoreError::validation_failed(
                "collected amount must be a non-negative amount",
            ));
        }
        if self.current_counter < self.previous_counter {
            return Err(CoreError::validation_failed(format!(
                "counter reading {} is below the previous reading {}",
                self.current_counter, self.previous_counter
            )));
        }
        Ok(())
    }
}

/// What a technician reads off a machine when collecting.
#[derive(Debug, Clone, PartialEq)]
pub struct CashReading {
    /// Amount collected.
    pub amount: f64,
    /// Counter shown by the machine.
    pub current_counter: u64,
    /// Collecting technician.
    pub technician: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl CashReading {
    /// Creates a reading without technician or notes.
    #[must_use]
    pub fn new(amount: f64, current_counter: u64) -> Self {
        Self {
            amount,
            current_counter,
            technician: None,
            notes: None,
        }
    }

    /// Sets the technician.
    #[must_use]
    pub fn technician(mut self, name: impl Into<String>) -> Self {
        self.technician = Some(name.into());
        self
    }

    /// Sets notes.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(amount: f64, previous: u64, current: u64) -> CashCollection {
        CashCollection {
            machine_id: Key::from("M1"),
            client_id: Some(Key::from(1)),
            amount,
            previous_counter: previous,
            current_counter: current,
            technician: None,
            notes: None,
        }
    }

    #[test]
    fn valid_collection() {
        collection(120.5, 100, 150).validate().unwrap();
    }

    #[test]
    fn negative_or_nan_amount_is_rejected() {
        assert!(collection(-1.0, 0, 0).validate().is_err());
        assert!(collection(f64::NAN, 0, 0).validate().is_err());
    }

    #[test]
    fn counter_cannot_run_backwards() {
        assert!(collection(10.0, 100, 99).validate().is_err());
    }
}
