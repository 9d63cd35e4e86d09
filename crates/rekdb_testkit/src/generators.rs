//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use proptest::prelude::*;
use rekdb_core::{Attributes, CashReading, Client, RESERVED_FIELDS};
use serde_json::Value;

/// Strategy for `HH:MM` times on the quarter hour.
pub fn time_strategy() -> impl Strategy<Value = String> {
    (0u8..24, prop::sample::select(vec![0u8, 15, 30, 45]))
        .prop_map(|(hour, minute)| format!("{hour:02}:{minute:02}"))
}

/// Strategy for free text, including accented characters.
pub fn text_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z áéíóúñÁÉÍÓÚÑ.,]{0,24}"
}

/// Strategy for valid clients.
///
/// Covers continuous and split schedules and present or absent notes.
pub fn client_strategy() -> impl Strategy<Value = Client> {
    let identity = (
        "[A-Z][a-záéíóúñ]{2,12}( [A-Z][a-záéíóúñ]{2,12})?",
        text_strategy(),
        text_strategy(),
        text_strategy(),
    );
    let location = (text_strategy(), text_strategy(), "[0-9]{5}");
    let contact = ("[6-9][0-9]{8}", "[a-z]{3,8}@[a-z]{3,8}\\.com", "B[0-9]{8}");
    let schedule = (
        time_strategy(),
        prop::option::of((time_strategy(), time_strategy())),
        time_strategy(),
        prop::sample::select(vec!["Lunes", "Martes", "Domingo", "Ninguno"]),
    );
    let extra = (prop::option::of("[A-Za-z ]{1,40}"), 0u32..10);

    (identity, location, contact, schedule, extra).prop_map(
        |(
            (name, business_type, owner, address),
            (city, province, postal_code),
            (phone, email, tax_id),
            (open, split, close, closing_day),
            (notes, machines),
        )| Client {
            name,
            business_type,
            owner,
            address,
            city,
            province,
            postal_code,
            phone,
            email,
            tax_id,
            morning_open_time: open,
            morning_close_time: split.as_ref().map(|(midday, _)| midday.clone()),
            evening_open_time: split.map(|(_, reopen)| reopen),
            evening_close_time: close,
            closing_day: closing_day.to_string(),
            machines,
            notes,
        },
    )
}

/// Strategy for a list of distinct-keyed clients.
pub fn clients_strategy(max: usize) -> impl Strategy<Value = Vec<Client>> {
    prop::collection::vec(client_strategy(), 0..=max)
}

/// Strategy for arbitrary flat attribute payloads.
pub fn attributes_strategy() -> impl Strategy<Value = Attributes> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        text_strategy().prop_map(Value::from),
        Just(Value::Null),
    ];
    prop::collection::btree_map("[a-z][a-zA-Z]{0,8}", leaf, 0..6).prop_map(|fields| {
        fields
            .into_iter()
            .filter(|(name, _)| !RESERVED_FIELDS.contains(&name.as_str()))
            .collect()
    })
}

/// Strategy for a sequence of non-decreasing counter readings starting at `from`.
pub fn readings_strategy(from: u64, max_len: usize) -> impl Strategy<Value = Vec<CashReading>> {
    prop::collection::vec((0u64..500, 0u32..100_000), 1..=max_len).prop_map(move |steps| {
        let mut counter = from;
        steps
            .into_iter()
            .map(|(step, cents)| {
                counter += step;
                CashReading::new(f64::from(cents) / 100.0, counter)
            })
            .collect()
    })
}
