//! Record types.

use crate::error::{CoreError, CoreResult};
use crate::types::Key;
use chrono::{DateTime, Utc};
use rekdb_codec::CodecError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute payload of a record.
pub type Attributes = Map<String, Value>;

/// Fields owned by the store; never part of an attribute payload.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// A stored entity.
///
/// Serializes as a flat JSON object: `id`, the attributes, `createdAt` and
/// `updatedAt`. A record without `updatedAt` decodes with it equal to
/// `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredRecord")]
pub struct Record {
    id: Key,
    #[serde(flatten)]
    attributes: Attributes,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    id: Key,
    #[serde(flatten)]
    attributes: Attributes,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredRecord> for Record {
    fn from(stored: StoredRecord) -> Self {
        Self {
            id: stored.id,
            attributes: stored.attributes,
            created_at: stored.created_at,
            updated_at: stored.updated_at.unwrap_or(stored.created_at),
        }
    }
}

impl Record {
    /// Creates a record with both timestamps set to `now`.
    pub(crate) fn create(key: Key, attributes: Attributes, now: DateTime<Utc>) -> Self {
        Self {
            id: key,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with `changes` merged over the attributes.
    pub(crate) fn merged(&self, changes: &Attributes, now: DateTime<Utc>) -> Self {
        let mut attributes = self.attributes.clone();
        for (field, value) in changes {
            attributes.insert(field.clone(), value.clone());
        }
        Self {
            id: self.id.clone(),
            attributes,
            created_at: self.created_at,
            updated_at: now,
        }
    }

    /// Returns the key.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.id
    }

    /// Returns the attribute payload.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns a single attribute.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Converts the record to its flat JSON form.
    pub fn to_value(&self) -> CoreResult<Value> {
        serde_json::to_value(self).map_err(|e| CodecError::encoding_failed(e.to_string()).into())
    }
}

/// A record to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Key of the new record.
    pub key: Key,
    /// Attribute payload.
    pub attributes: Attributes,
}

impl NewRecord {
    /// Creates a new record payload, dropping store-owned fields.
    #[must_use]
    pub fn new(key: impl Into<Key>, attributes: Attributes) -> Self {
        Self {
            key: key.into(),
            attributes: strip_reserved(attributes),
        }
    }

    /// Creates a new record from a JSON object.
    pub fn from_value(key: impl Into<Key>, value: Value) -> CoreResult<Self> {
        Ok(Self::new(key, into_object(value)?))
    }

    /// Creates a new record from any serializable body.
    pub fn from_body<T: Serialize>(key: impl Into<Key>, body: &T) -> CoreResult<Self> {
        Ok(Self::new(key, to_attributes(body)?))
    }
}

/// A partial update merged onto an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Key of the record to update.
    pub key: Key,
    /// Top-level fields to overwrite.
    pub attributes: Attributes,
}

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            attributes: Attributes::new(),
        }
    }

    /// Sets a field.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        if !RESERVED_FIELDS.contains(&field.as_str()) {
            self.attributes.insert(field, value.into());
        }
        self
    }

    /// Sets every field of `changes`.
    #[must_use]
    pub fn merge(mut self, changes: Attributes) -> Self {
        self.attributes.extend(strip_reserved(changes));
        self
    }

    /// Creates a patch from a JSON object.
    pub fn from_value(key: impl Into<Key>, value: Value) -> CoreResult<Self> {
        Ok(Self {
            key: key.into(),
            attributes: strip_reserved(into_object(value)?),
        })
    }

    /// Creates a patch that sets every field of a serializable body.
    pub fn from_body<T: Serialize>(key: impl Into<Key>, body: &T) -> CoreResult<Self> {
        Ok(Self {
            key: key.into(),
            attributes: strip_reserved(to_attributes(body)?),
        })
    }
}

/// Serializes a body into an attribute payload.
pub(crate) fn to_attributes<T: Serialize>(body: &T) -> CoreResult<Attributes> {
    let value =
        serde_json::to_value(body).map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    into_object(value)
}

fn into_object(value: Value) -> CoreResult<Attributes> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::validation_failed(format!(
            "entity payload must be a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

fn strip_reserved(mut attributes: Attributes) -> Attributes {
    for field in RESERVED_FIELDS {
        attributes.remove(field);
    }
    attributes
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn record_serializes_flat() {
        let attrs = into_object(json!({"name": "Bar El Rincón"})).unwrap();
        let record = Record::create(Key::from(1), attrs, at(0));
        let value = record.to_value().unwrap();

        assert_eq!(value["id"], json!(1));
        assert_eq!(value["name"], json!("Bar El Rincón"));
        assert!(value["createdAt"].is_string());
        assert!(value.get("attributes").is_none());

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn missing_updated_at_falls_back_to_created_at() {
        let record: Record = serde_json::from_value(json!({
            "id": "c1",
            "amount": 20,
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.updated_at(), record.created_at());
        assert_eq!(record.get("amount"), Some(&json!(20)));
        assert!(record.get("updatedAt").is_none());
    }

    #[test]
    fn merge_preserves_created_at_and_untouched_fields() {
        let attrs = into_object(json!({"name": "A", "city": "Madrid"})).unwrap();
        let record = Record::create(Key::from("M1"), attrs, at(0));
        let changes = into_object(json!({"city": "Sevilla"})).unwrap();

        let merged = record.merged(&changes, at(10));
        assert_eq!(merged.get("name"), Some(&json!("A")));
        assert_eq!(merged.get("city"), Some(&json!("Sevilla")));
        assert_eq!(merged.created_at(), at(0));
        assert_eq!(merged.updated_at(), at(10));
    }

    #[test]
    fn reserved_fields_are_stripped() {
        let record = NewRecord::from_value(
            3,
            json!({"id": 99, "createdAt": "x", "updatedAt": "y", "name": "A"}),
        )
        .unwrap();
        assert_eq!(record.key, Key::from(3));
        assert_eq!(record.attributes.len(), 1);

        let patch = Patch::new(3).set("id", 5).set("name", "B");
        assert_eq!(patch.attributes.len(), 1);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = NewRecord::from_value(1, json!([1, 2])).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }
}
