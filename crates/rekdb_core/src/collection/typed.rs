//! Typed collection implementation.

use crate::collection::{Entity, EntityKind};
use crate::database::Database;
use crate::entity::{NewRecord, Patch};
use crate::error::{CoreError, CoreResult};
use crate::types::Key;
use std::marker::PhantomData;

/// A typed view over one collection.
///
/// `Collection<K>` encodes and decodes [`Entity<K>`] values over the
/// database's untyped record primitives, so writes still pass the schema
/// boundary and the same locking.
///
/// # Example
///
/// ```rust
/// use rekdb_core::{Client, Database};
///
/// let db = Database::open_in_memory().unwrap();
/// let clients = db.collection::<Client>();
///
/// let client = Client {
///     name: "Bar El Rincón".into(),
///     morning_open_time: "08:00".into(),
///     evening_close_time: "23:00".into(),
///     ..Client::default()
/// };
/// clients.add(1, &client).unwrap();
///
/// let found = clients.get(&1.into()).unwrap();
/// assert_eq!(found.body.name, "Bar El Rincón");
/// ```
pub struct Collection<'db, K: EntityKind> {
    db: &'db Database,
    _marker: PhantomData<fn() -> K>,
}

impl<'db, K: EntityKind> Collection<'db, K> {
    pub(crate) fn new(db: &'db Database) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        K::COLLECTION
    }

    /// Gets an entity by key.
    pub fn get(&self, key: &Key) -> CoreResult<Entity<K>> {
        Entity::from_record(&self.db.get(K::COLLECTION, key)?)
    }

    /// Gets an entity by key, returning `None` if absent.
    pub fn find(&self, key: &Key) -> CoreResult<Option<Entity<K>>> {
        match self.get(key) {
            Ok(entity) => Ok(Some(entity)),
            Err(CoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns every entity, in insertion order.
    pub fn list(&self) -> CoreResult<Vec<Entity<K>>> {
        self.db
            .get_all(K::COLLECTION)?
            .iter()
            .map(Entity::from_record)
            .collect()
    }

    /// Inserts a new entity.
    pub fn add(&self, key: impl Into<Key>, body: &K) -> CoreResult<Entity<K>> {
        let record = self
            .db
            .add(K::COLLECTION, NewRecord::from_body(key, body)?)?;
        Entity::from_record(&record)
    }

    /// Merges every field of `body` onto the entity, creating it if absent.
    ///
    /// Optional fields set to `None` are written as `null`, clearing the
    /// stored value. Attributes outside `K` keep their stored value.
    pub fn put(&self, key: impl Into<Key>, body: &K) -> CoreResult<Entity<K>> {
        self.update(Patch::from_body(key, body)?)
    }

    /// Applies a partial update.
    pub fn update(&self, patch: Patch) -> CoreResult<Entity<K>> {
        let record = self.db.put(K::COLLECTION, patch)?;
        Entity::from_record(&record)
    }

    /// Deletes an entity; absent keys are ignored.
    pub fn delete(&self, key: &Key) -> CoreResult<()> {
        self.db.delete(K::COLLECTION, key)
    }

    /// Returns the number of entities.
    pub fn count(&self) -> CoreResult<usize> {
        self.db.count(K::COLLECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Client;

    fn split_client() -> Client {
        Client {
            name: "Bar El Rincón".into(),
            morning_open_time: "08:00".into(),
            morning_close_time: Some("14:00".into()),
            evening_open_time: Some("17:00".into()),
            evening_close_time: "23:00".into(),
            notes: Some("old note".into()),
            ..Client::default()
        }
    }

    #[test]
    fn put_clears_optional_fields() {
        let db = Database::open_in_memory().unwrap();
        let clients = db.collection::<Client>();
        clients.add(1, &split_client()).unwrap();

        let continuous = Client {
            morning_close_time: None,
            evening_open_time: None,
            notes: None,
            ..split_client()
        };
        let after = clients.put(1, &continuous).unwrap();
        assert_eq!(after.body, continuous);

        let stored = clients.get(&Key::from(1)).unwrap();
        assert_eq!(stored.body.morning_close_time, None);
        assert_eq!(stored.body.evening_open_time, None);
        assert_eq!(stored.body.notes, None);
    }

    #[test]
    fn put_keeps_attributes_outside_the_kind() {
        let db = Database::open_in_memory().unwrap();
        let clients = db.collection::<Client>();
        clients.add(1, &split_client()).unwrap();
        clients
            .update(Patch::new(1).set("loyaltyTier", "gold"))
            .unwrap();

        clients.put(1, &split_client()).unwrap();
        let record = db.get(Client::COLLECTION, &Key::from(1)).unwrap();
        assert_eq!(record.get("loyaltyTier"), Some(&serde_json::json!("gold")));
    }
}
