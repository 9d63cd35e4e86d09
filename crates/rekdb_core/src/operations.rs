//! Multi-collection business operations.

use crate::collection::{Entity, EntityKind};
use crate::database::Database;
use crate::domain::{
    CashCollection, CashReading, Client, HistoryAction, HistoryEntry, Installation, Machine,
    MachineStatus,
};
use crate::entity::{NewRecord, Patch};
use crate::error::{CoreError, CoreResult};
use crate::transaction::Transaction;
use crate::types::{Key, CASH_COLLECTIONS, CLIENTS, MACHINES};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

impl Database {
    /// Records cash taken from a machine.
    ///
    /// Inserts the cash collection, moves the machine counter to the
    /// reading and appends a `collection` history entry, all or nothing.
    ///
    /// # Errors
    ///
    /// `TransactionAborted` if the machine does not exist or the reading is
    /// below the machine's current counter.
    pub fn record_cash_collection(
        &self,
        machine_key: &Key,
        reading: CashReading,
    ) -> CoreResult<Entity<CashCollection>> {
        let collected = self.transaction(&[CASH_COLLECTIONS, MACHINES], |txn| {
            let machine = load::<Machine>(txn, machine_key)?;
            if reading.current_counter < machine.body.current_counter {
                return Err(CoreError::validation_failed(format!(
                    "counter reading {} is below the current counter {} of machine {machine_key}",
                    reading.current_counter, machine.body.current_counter
                )));
            }

            let collection = CashCollection {
                machine_id: machine_key.clone(),
                client_id: machine.body.client_id.clone(),
                amount: reading.amount,
                previous_counter: machine.body.current_counter,
                current_counter: reading.current_counter,
                technician: reading.technician,
                notes: reading.notes,
            };
            let record = txn.add(
                CASH_COLLECTIONS,
                NewRecord::from_body(Key::generate(), &collection)?,
            )?;

            let history = appended(
                &machine.body,
                txn.now(),
                HistoryAction::Collection,
                format!("Collection of {} recorded", reading.amount),
            )?;
            txn.put(
                MACHINES,
                Patch::new(machine_key.clone())
                    .set("currentCounter", reading.current_counter)
                    .set("history", history),
            )?;

            Entity::<CashCollection>::from_record(&record)
        })?;
        info!(machine = %machine_key, amount = collected.body.amount, "cash collection recorded");
        Ok(collected)
    }

    /// Installs a warehouse machine at a client.
    ///
    /// Sets status, client, installation record and the counter observed at
    /// installation, appends an `installation` history entry and increments
    /// the client's machine count.
    pub fn install_machine(
        &self,
        machine_key: &Key,
        client_key: &Key,
        installation: Installation,
    ) -> CoreResult<Entity<Machine>> {
        let machine = self.transaction(&[MACHINES, CLIENTS], |txn| {
            let machine = load::<Machine>(txn, machine_key)?;
            if machine.body.is_installed() {
                return Err(CoreError::validation_failed(format!(
                    "machine {machine_key} is already installed"
                )));
            }
            let client = load::<Client>(txn, client_key)?;

            let history = appended(
                &machine.body,
                txn.now(),
                HistoryAction::Installation,
                format!("Installed at {}", client.body.name),
            )?;
            let installation_value = to_value(&installation)?;
            let record = txn.put(
                MACHINES,
                Patch::new(machine_key.clone())
                    .set("status", to_value(&MachineStatus::Installed)?)
                    .set("clientId", to_value(client_key)?)
                    .set("currentCounter", installation.installation_counter)
                    .set("installation", installation_value)
                    .set("history", history),
            )?;
            txn.put(
                CLIENTS,
                Patch::new(client_key.clone()).set("machines", one_more(&client)?),
            )?;

            Entity::<Machine>::from_record(&record)
        })?;
        info!(machine = %machine_key, client = %client_key, "machine installed");
        Ok(machine)
    }

    /// Moves an installed machine to another client.
    ///
    /// Adjusts both clients' machine counts, sets the counter explicitly
    /// and appends a `transfer` history entry. The previous client may
    /// have been deleted in the meantime.
    pub fn transfer_machine(
        &self,
        machine_key: &Key,
        to_client_key: &Key,
        counter: u64,
    ) -> CoreResult<Entity<Machine>> {
        let machine = self.transaction(&[MACHINES, CLIENTS], |txn| {
            let machine = load::<Machine>(txn, machine_key)?;
            let from_key = match (&machine.body.status, &machine.body.client_id) {
                (MachineStatus::Installed, Some(key)) => key.clone(),
                _ => {
                    return Err(CoreError::validation_failed(format!(
                        "machine {machine_key} is not installed at any client"
                    )))
                }
            };
            if &from_key == to_client_key {
                return Err(CoreError::validation_failed(format!(
                    "machine {machine_key} is already installed at client {to_client_key}"
                )));
            }
            let target = load::<Client>(txn, to_client_key)?;
            let source = match txn.find(CLIENTS, &from_key)? {
                Some(record) => Some(Entity::<Client>::from_record(&record)?),
                None => None,
            };

            let from_name = source
                .as_ref()
                .map_or_else(|| from_key.to_string(), |c| c.body.name.clone());
            let history = appended(
                &machine.body,
                txn.now(),
                HistoryAction::Transfer,
                format!("Transferred from {from_name} to {}", target.body.name),
            )?;
            let record = txn.put(
                MACHINES,
                Patch::new(machine_key.clone())
                    .set("clientId", to_value(to_client_key)?)
                    .set("currentCounter", counter)
                    .set("history", history),
            )?;

            if let Some(source) = source {
                txn.put(
                    CLIENTS,
                    Patch::new(from_key)
                        .set("machines", source.body.machines.saturating_sub(1)),
                )?;
            }
            txn.put(
                CLIENTS,
                Patch::new(to_client_key.clone()).set("machines", one_more(&target)?),
            )?;

            Entity::<Machine>::from_record(&record)
        })?;
        info!(machine = %machine_key, client = %to_client_key, "machine transferred");
        Ok(machine)
    }
}

fn load<K: EntityKind>(txn: &Transaction<'_>, key: &Key) -> CoreResult<Entity<K>> {
    Entity::from_record(&txn.get(K::COLLECTION, key)?)
}

fn one_more(client: &Entity<Client>) -> CoreResult<u32> {
    client.body.machines.checked_add(1).ok_or_else(|| {
        CoreError::validation_failed(format!(
            "client {} cannot hold more machines",
            client.id
        ))
    })
}

fn appended(
    machine: &Machine,
    date: DateTime<Utc>,
    action: HistoryAction,
    details: String,
) -> CoreResult<Value> {
    let mut history = machine.history.clone();
    history.push(HistoryEntry {
        date,
        action,
        details,
    });
    to_value(&history)
}

fn to_value<T: serde::Serialize>(value: &T) -> CoreResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| rekdb_codec::CodecError::encoding_failed(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn db_with_fleet() -> Database {
        let db = Database::open_in_memory().unwrap();
        let clients = db.collection::<Client>();
        for (key, name) in [(1, "Bar El Rincón"), (2, "Cafetería Central")] {
            let client = Client {
                name: name.into(),
                morning_open_time: "08:00".into(),
                evening_close_time: "23:00".into(),
                ..Client::default()
            };
            clients.add(key, &client).unwrap();
        }
        let machine = Machine {
            serial_number: "SN-001".into(),
            current_counter: 100,
            ..Machine::default()
        };
        db.collection::<Machine>().add("M1", &machine).unwrap();
        db
    }

    fn installation(counter: u64) -> Installation {
        Installation {
            responsible_name: "Ana".into(),
            responsible_id: "12345678A".into(),
            accepted_terms: true,
            accepted_responsibility: true,
            acceptance_date: None,
            installation_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            installation_counter: counter,
            location: "Entrada".into(),
            observations: None,
            technician: "Luis".into(),
        }
    }

    #[test]
    fn install_then_transfer() {
        let db = db_with_fleet();
        let machine_key = Key::from("M1");

        let installed = db
            .install_machine(&machine_key, &Key::from(1), installation(120))
            .unwrap();
        assert_eq!(installed.body.status, MachineStatus::Installed);
        assert_eq!(installed.body.client_id, Some(Key::from(1)));
        assert_eq!(installed.body.current_counter, 120);
        assert_eq!(
            installed.body.last_event().map(|e| e.action),
            Some(HistoryAction::Installation)
        );

        let moved = db
            .transfer_machine(&machine_key, &Key::from(2), 90)
            .unwrap();
        assert_eq!(moved.body.client_id, Some(Key::from(2)));
        assert_eq!(moved.body.current_counter, 90);
        assert_eq!(moved.body.history.len(), 2);

        let clients = db.collection::<Client>();
        assert_eq!(clients.get(&Key::from(1)).unwrap().body.machines, 0);
        assert_eq!(clients.get(&Key::from(2)).unwrap().body.machines, 1);
    }

    #[test]
    fn installing_twice_is_rejected() {
        let db = db_with_fleet();
        let machine_key = Key::from("M1");
        db.install_machine(&machine_key, &Key::from(1), installation(100))
            .unwrap();

        let err = db
            .install_machine(&machine_key, &Key::from(2), installation(100))
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            CoreError::ValidationFailed { .. }
        ));
        let clients = db.collection::<Client>();
        assert_eq!(clients.get(&Key::from(2)).unwrap().body.machines, 0);
    }

    #[test]
    fn install_requires_existing_client() {
        let db = db_with_fleet();
        let err = db
            .install_machine(&Key::from("M1"), &Key::from(99), installation(100))
            .unwrap_err();
        assert!(matches!(err.root_cause(), CoreError::NotFound { .. }));

        let machine = db.collection::<Machine>().get(&Key::from("M1")).unwrap();
        assert_eq!(machine.body.status, MachineStatus::Warehouse);
    }

    #[test]
    fn full_client_cannot_take_another_machine() {
        let db = db_with_fleet();
        db.collection::<Client>()
            .update(Patch::new(1).set("machines", u32::MAX))
            .unwrap();

        let err = db
            .install_machine(&Key::from("M1"), &Key::from(1), installation(100))
            .unwrap_err();
        assert!(err.to_string().contains("cannot hold more machines"));

        let machine = db.collection::<Machine>().get(&Key::from("M1")).unwrap();
        assert_eq!(machine.body.status, MachineStatus::Warehouse);
    }

    #[test]
    fn transfer_of_warehouse_machine_is_rejected() {
        let db = db_with_fleet();
        let err = db
            .transfer_machine(&Key::from("M1"), &Key::from(2), 100)
            .unwrap_err();
        assert!(err.to_string().contains("not installed"));
    }

    #[test]
    fn collection_below_counter_is_rejected() {
        let db = db_with_fleet();
        let err = db
            .record_cash_collection(&Key::from("M1"), CashReading::new(10.0, 99))
            .unwrap_err();
        assert!(matches!(err, CoreError::TransactionAborted { .. }));
        assert_eq!(db.count(CASH_COLLECTIONS).unwrap(), 0);
    }
}
