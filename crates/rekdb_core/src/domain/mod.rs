//! Domain entity kinds of the amusement-machine business.

mod cash;
mod client;
mod machine;

pub use cash::{CashCollection, CashReading};
pub use client::Client;
pub use machine::{HistoryAction, HistoryEntry, Installation, Machine, MachineStatus};

use crate::collection::SchemaRegistry;

/// Returns a registry with every domain kind registered.
#[must_use]
pub fn domain_schemas() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register::<Client>();
    registry.register::<Machine>();
    registry.register::<CashCollection>();
    registry
}
