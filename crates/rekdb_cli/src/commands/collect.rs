//! Collect command implementation.

use rekdb_core::CashReading;
use std::path::Path;

/// Records a cash collection from `machine`.
pub fn run(
    db_path: &Path,
    machine: &str,
    amount: f64,
    counter: u64,
    technician: Option<String>,
    notes: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open(db_path)?;

    let mut reading = CashReading::new(amount, counter);
    if let Some(technician) = technician {
        reading = reading.technician(technician);
    }
    if let Some(notes) = notes {
        reading = reading.notes(notes);
    }

    let collected = db.record_cash_collection(&super::parse_key(machine), reading)?;

    println!("✓ Collection recorded");
    println!("  Id:      {}", collected.id);
    println!("  Machine: {}", collected.body.machine_id);
    println!("  Amount:  {:.2}", collected.body.amount);
    println!(
        "  Counter: {} -> {}",
        collected.body.previous_counter, collected.body.current_counter
    );
    db.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekdb_core::{Machine, CASH_COLLECTIONS};

    #[test]
    fn collect_updates_machine_counter() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("rekdb.json");
        let db = super::super::open(&db_path).unwrap();
        let machine = Machine {
            serial_number: "SN-9".into(),
            current_counter: 40,
            ..Machine::default()
        };
        db.collection::<Machine>().add("M9", &machine).unwrap();
        drop(db);

        run(&db_path, "M9", 15.5, 70, Some("Luis".into()), None).unwrap();

        let db = super::super::open(&db_path).unwrap();
        assert_eq!(db.count(CASH_COLLECTIONS).unwrap(), 1);
        let machine = db.collection::<Machine>().get(&"M9".into()).unwrap();
        assert_eq!(machine.body.current_counter, 70);
    }

    #[test]
    fn collect_from_unknown_machine_fails() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("rekdb.json");
        assert!(run(&db_path, "M404", 1.0, 1, None, None).is_err());
    }
}
