//! Record store contract.

use chrono::Duration;
use proptest::prelude::*;
use rekdb_core::{Config, CoreError, Database, Key, NewRecord, Patch, EXPENSES};
use rekdb_storage::FileBackend;
use rekdb_testkit::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn added_records_read_back(attributes in attributes_strategy(), key in "[a-z0-9]{1,12}") {
        let test_db = TestDatabase::memory();
        let added = test_db
            .add(EXPENSES, NewRecord::new(key.as_str(), attributes.clone()))
            .unwrap();

        let found = test_db.get(EXPENSES, &Key::from(key.as_str())).unwrap();
        prop_assert_eq!(found.attributes(), &attributes);
        prop_assert_eq!(found, added);
    }

    #[test]
    fn put_twice_only_moves_updated_at(attributes in attributes_strategy()) {
        let test_db = TestDatabase::memory();
        test_db
            .add(EXPENSES, NewRecord::from_value("e1", json!({"amount": 5})).unwrap())
            .unwrap();
        let patch = Patch::new("e1").merge(attributes);

        test_db.clock.advance(Duration::seconds(1));
        let first = test_db.put(EXPENSES, patch.clone()).unwrap();
        test_db.clock.advance(Duration::seconds(1));
        let second = test_db.put(EXPENSES, patch).unwrap();

        prop_assert_eq!(first.attributes(), second.attributes());
        prop_assert_eq!(first.created_at(), second.created_at());
        prop_assert!(second.updated_at() > first.updated_at());
    }
}

#[test]
fn duplicate_add_is_rejected() {
    with_temp_db(|db| {
        db.add(EXPENSES, NewRecord::from_value("e1", json!({})).unwrap())
            .unwrap();
        let err = db
            .add(EXPENSES, NewRecord::from_value("e1", json!({})).unwrap())
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey { .. }));
    });
}

#[test]
fn get_missing_is_not_found() {
    with_temp_db(|db| {
        let err = db.get(EXPENSES, &Key::from("nope")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "entity not found: nope in collection expenses"
        );
    });
}

#[test]
fn delete_of_absent_key_changes_nothing() {
    with_temp_db(|db| {
        db.add(EXPENSES, NewRecord::from_value("e1", json!({"amount": 1})).unwrap())
            .unwrap();
        let before = db.get_all(EXPENSES).unwrap();

        db.delete(EXPENSES, &Key::from("e404")).unwrap();
        db.delete("never_declared", &Key::from(1)).unwrap();

        assert_eq!(db.get_all(EXPENSES).unwrap(), before);
    });
}

#[test]
fn deleting_last_record_keeps_collection() {
    with_temp_db(|db| {
        db.add("routes", NewRecord::from_value("r1", json!({})).unwrap())
            .unwrap();
        db.delete("routes", &Key::from("r1")).unwrap();

        assert!(db.collection_names().unwrap().contains(&"routes".to_string()));
        assert!(db.get_all("routes").unwrap().is_empty());
    });
}

#[test]
fn failed_persist_leaves_store_unchanged() {
    let backend = FlakyBackend::new();
    let test_db = TestDatabase::with_backend(Box::new(backend.clone()));
    test_db
        .add(EXPENSES, NewRecord::from_value("e1", json!({"amount": 1})).unwrap())
        .unwrap();

    backend.fail_writes(true);
    let err = test_db
        .put(EXPENSES, Patch::new("e1").set("amount", 2))
        .unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)));
    assert_eq!(backend.rejected_writes(), 1);

    let stored = test_db.get(EXPENSES, &Key::from("e1")).unwrap();
    assert_eq!(stored.get("amount"), Some(&json!(1)));
}

#[test]
fn file_database_survives_reopen() {
    with_file_db(|db, path| {
        db.add(EXPENSES, NewRecord::from_value("e1", json!({"amount": 7})).unwrap())
            .unwrap();
        let written = db.get(EXPENSES, &Key::from("e1")).unwrap();

        let backend = FileBackend::open(path).unwrap();
        let reopened = Database::open(Box::new(backend), Config::default()).unwrap();
        assert_eq!(reopened.get(EXPENSES, &Key::from("e1")).unwrap(), written);
        assert!(reopened.storage_size().unwrap() > 0);
    });
}
