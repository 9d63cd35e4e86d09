//! Schema validation at the write boundary.

use crate::collection::EntityKind;
use crate::entity::Record;
use crate::error::CoreResult;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Validates records written to a collection.
pub trait Schema: Send + Sync {
    /// Validates `next`, the record about to be stored.
    ///
    /// `previous` is the stored record when `next` updates one.
    fn validate(&self, previous: Option<&Record>, next: &Record) -> CoreResult<()>;
}

/// Schema derived from an [`EntityKind`].
pub struct KindSchema<K>(PhantomData<fn() -> K>);

impl<K> KindSchema<K> {
    /// Creates the schema.
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K> Default for KindSchema<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityKind> Schema for KindSchema<K> {
    fn validate(&self, previous: Option<&Record>, next: &Record) -> CoreResult<()> {
        let next = K::from_record(next)?;
        next.validate()?;
        // Records imported before a rule existed may not decode.
        if let Some(previous) = previous.and_then(|record| K::from_record(record).ok()) {
            K::check_transition(&previous, &next)?;
        }
        Ok(())
    }
}

/// Schemas by collection name.
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<dyn Schema>>,
}

impl SchemaRegistry {
    /// Creates an empty registry; every collection accepts any object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the schema of an entity kind.
    pub fn register<K: EntityKind>(&mut self) {
        self.register_schema(K::COLLECTION, Arc::new(KindSchema::<K>::new()));
    }

    /// Registers a custom schema for a collection.
    pub fn register_schema(&mut self, collection: impl Into<String>, schema: Arc<dyn Schema>) {
        self.schemas.insert(collection.into(), schema);
    }

    /// Returns whether the collection has a schema.
    #[must_use]
    pub fn is_registered(&self, collection: &str) -> bool {
        self.schemas.contains_key(collection)
    }

    /// Validates a write to a collection.
    pub fn validate(
        &self,
        collection: &str,
        previous: Option<&Record>,
        next: &Record,
    ) -> CoreResult<()> {
        match self.schemas.get(collection) {
            Some(schema) => schema.validate(previous, next),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("SchemaRegistry")
            .field("collections", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::KeyStrategy;
    use crate::entity::NewRecord;
    use crate::error::CoreError;
    use crate::types::Key;
    use chrono::Utc;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Gauge {
        level: u32,
    }

    impl EntityKind for Gauge {
        const COLLECTION: &'static str = "gauges";
        const KEYS: KeyStrategy = KeyStrategy::Generated;

        fn validate(&self) -> CoreResult<()> {
            if self.level > 10 {
                return Err(CoreError::validation_failed("level must be at most 10"));
            }
            Ok(())
        }

        fn check_transition(previous: &Self, next: &Self) -> CoreResult<()> {
            if next.level < previous.level {
                return Err(CoreError::validation_failed("level cannot go down"));
            }
            Ok(())
        }
    }

    fn record(value: serde_json::Value) -> Record {
        let new = NewRecord::from_value("g", value).unwrap();
        Record::create(Key::from("g"), new.attributes, Utc::now())
    }

    #[test]
    fn unregistered_collection_accepts_anything() {
        let registry = SchemaRegistry::new();
        registry
            .validate("gauges", None, &record(json!({"anything": true})))
            .unwrap();
    }

    #[test]
    fn kind_rules_apply() {
        let mut registry = SchemaRegistry::new();
        registry.register::<Gauge>();

        registry
            .validate("gauges", None, &record(json!({"level": 3})))
            .unwrap();
        assert!(registry
            .validate("gauges", None, &record(json!({"level": 11})))
            .is_err());
        assert!(registry
            .validate("gauges", None, &record(json!({"level": "high"})))
            .is_err());
    }

    #[test]
    fn transition_rules_apply() {
        let mut registry = SchemaRegistry::new();
        registry.register::<Gauge>();

        let before = record(json!({"level": 5}));
        let err = registry
            .validate("gauges", Some(&before), &record(json!({"level": 4})))
            .unwrap_err();
        assert_eq!(err.to_string(), "validation failed: level cannot go down");
    }
}
