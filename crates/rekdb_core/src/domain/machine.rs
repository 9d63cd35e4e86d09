//! Machines and their event history.

use crate::collection::{EntityKind, KeyStrategy};
use crate::error::{CoreError, CoreResult};
use crate::types::{Key, MACHINES};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where a machine currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    /// In the warehouse.
    #[default]
    Warehouse,
    /// Installed at a client.
    Installed,
    /// Out of service.
    Inactive,
}

/// Kind of a history event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    /// Installed at a client.
    Installation,
    /// Moved between clients.
    Transfer,
    /// Cash collected.
    Collection,
}

/// One entry of a machine's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the event happened.
    pub date: DateTime<Utc>,
    /// What happened.
    pub action: HistoryAction,
    /// Human-readable description.
    pub details: String,
}

/// Signed installation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    /// Person at the venue responsible for the machine.
    pub responsible_name: String,
    /// Identity document of the responsible person.
    pub responsible_id: String,
    /// Whether the terms were accepted.
    pub accepted_terms: bool,
    /// Whether responsibility for the machine was accepted.
    pub accepted_responsibility: bool,
    /// When the terms were accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_date: Option<DateTime<Utc>>,
    /// Installation day.
    pub installation_date: NaiveDate,
    /// Counter reading at installation.
    pub installation_counter: u64,
    /// Placement inside the venue.
    #[serde(default)]
    pub location: String,
    /// Free-form observations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Installing technician.
    #[serde(default)]
    pub technician: String,
}

/// An amusement machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Machine {
    /// Manufacturer serial number.
    pub serial_number: String,
    /// Machine type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Model.
    pub model: String,
    /// Brand.
    pub brand: String,
    /// Purchase cost.
    pub cost: f64,
    /// Purchase day.
    pub purchase_date: Option<NaiveDate>,
    /// Current status.
    pub status: MachineStatus,
    /// Client the machine is installed at.
    pub client_id: Option<Key>,
    /// Counter reading when the machine entered service.
    pub initial_counter: u64,
    /// Latest counter reading.
    pub current_counter: u64,
    /// Percentage of the takings kept by the operator.
    pub split_percentage: u8,
    /// Current installation record.
    pub installation: Option<Installation>,
    /// Append-only event history.
    pub history: Vec<HistoryEntry>,
}

impl Default for Machine {
    fn default() -> Self {
        Self {
            serial_number: String::new(),
            kind: String::new(),
            model: String::new(),
            brand: String::new(),
            cost: 0.0,
            purchase_date: None,
            status: MachineStatus::Warehouse,
            client_id: None,
            initial_counter: 0,
            current_counter: 0,
            split_percentage: 50,
            installation: None,
            history: Vec::new(),
        }
    }
}

impl Machine {
    /// Returns whether the machine is installed at a client.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.status == MachineStatus::Installed
    }

    /// Returns the most recent history entry.
    #[must_use]
    pub fn last_event(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}

impl EntityKind for Machine {
    const COLLECTION: &'static str = MACHINES;
    const KEYS: KeyStrategy = KeyStrategy::Generated;

    fn validate(&self) -> CoreResult<()> {
        if self.serial_number.trim().is_empty() {
            return Err(CoreError::validation_failed(
                "machine serial number is required",
            ));
        }
        if self.split_percentage > 100 {
            return Err(CoreError::validation_failed(format!(
                "split percentage must be between 0 and 100, got {}",
                self.split_percentage
            )));
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(CoreError::validation_failed(
                "machine cost must be a non-negative amount",
            ));
        }
        if self.is_installed() && self.client_id.is_none() {
            return Err(CoreError::validation_failed(
                "an installed machine must reference a client",
            ));
        }
        if let Some(installation) = &self.installation {
            if !installation.accepted_terms || !installation.accepted_responsibility {
                return Err(CoreError::validation_failed(
                    "installation requires accepted terms and responsibility",
                ));
            }
        }
        Ok(())
    }

    fn check_transition(previous: &Self, next: &Self) -> CoreResult<()> {
        let kept = previous.history.len();
        if next.history.len() < kept || next.history[..kept] != previous.history[..] {
            return Err(CoreError::validation_failed(
                "machine history is append-only",
            ));
        }
        if next.current_counter < previous.current_counter && next.history.len() == kept {
            return Err(CoreError::validation_failed(format!(
                "machine counter cannot go from {} down to {} without a recorded event",
                previous.current_counter, next.current_counter
            )));
        }
        Ok(())
    }
}
