//! Clients: the venues machines are installed at.

use crate::collection::{EntityKind, KeyStrategy};
use crate::error::{CoreError, CoreResult};
use crate::types::CLIENTS;
use serde::{Deserialize, Serialize};

/// A client venue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    /// Venue name.
    pub name: String,
    /// Kind of business (bar, restaurant, ...).
    pub business_type: String,
    /// Owner's name.
    pub owner: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Province.
    pub province: String,
    /// Postal code.
    pub postal_code: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Tax identifier.
    pub tax_id: String,
    /// Opening time.
    pub morning_open_time: String,
    /// Midday closing time of a split schedule.
    pub morning_close_time: Option<String>,
    /// Afternoon reopening time of a split schedule.
    pub evening_open_time: Option<String>,
    /// Closing time.
    pub evening_close_time: String,
    /// Weekly closing day.
    pub closing_day: String,
    /// Number of machines installed at the venue.
    pub machines: u32,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Client {
    /// Returns whether the venue closes at midday.
    #[must_use]
    pub fn is_split_schedule(&self) -> bool {
        filled(&self.morning_close_time).is_some() && filled(&self.evening_open_time).is_some()
    }

    /// Renders the opening schedule, e.g. `09:00-14:00 y 17:00-22:00`.
    #[must_use]
    pub fn schedule(&self) -> String {
        match (
            filled(&self.morning_close_time),
            filled(&self.evening_open_time),
        ) {
            (Some(close), Some(reopen)) => format!(
                "{}-{close} y {reopen}-{}",
                self.morning_open_time, self.evening_close_time
            ),
            _ => format!("{}-{}", self.morning_open_time, self.evening_close_time),
        }
    }
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl EntityKind for Client {
    const COLLECTION: &'static str = CLIENTS;
    const KEYS: KeyStrategy = KeyStrategy::Sequential;

    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation_failed("client name is required"));
        }
        if self.morning_open_time.trim().is_empty() {
            return Err(CoreError::validation_failed("specify the opening time"));
        }
        if self.evening_close_time.trim().is_empty() {
            return Err(CoreError::validation_failed("specify the closing time"));
        }
        if filled(&self.morning_close_time).is_some() != filled(&self.evening_open_time).is_some() {
            return Err(CoreError::validation_failed(
                "specify both split-schedule times or neither",
            ));
        }
        Ok(())
    }
}
