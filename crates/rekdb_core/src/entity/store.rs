//! In-process record store.

use crate::entity::Record;
use crate::error::CoreResult;
use crate::transaction::PendingWrite;
use crate::types::Key;
use indexmap::IndexMap;
use rekdb_codec::{decode_image, encode_image, StoreImage};

/// Named collections of records, each ordered by insertion.
///
/// The store is plain state: it performs no validation and no locking.
/// The [`Database`](crate::Database) owns it behind a lock and routes every
/// mutation through a [`Transaction`](crate::Transaction).
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    collections: IndexMap<String, IndexMap<Key, Record>>,
}

impl RecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the collection if it does not exist.
    pub fn declare(&mut self, name: &str) {
        if !self.collections.contains_key(name) {
            self.collections.insert(name.to_string(), IndexMap::new());
        }
    }

    /// Returns whether the collection exists.
    #[must_use]
    pub fn contains_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Returns collection names in declaration order.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Returns every record in a collection, in insertion order.
    ///
    /// An unknown collection is empty.
    #[must_use]
    pub fn get_all(&self, collection: &str) -> Vec<Record> {
        self.records(collection).cloned().collect()
    }

    /// Iterates the records of a collection.
    pub fn records(&self, collection: &str) -> impl Iterator<Item = &Record> {
        self.collections
            .get(collection)
            .into_iter()
            .flat_map(IndexMap::values)
    }

    /// Returns a record by key.
    #[must_use]
    pub fn get(&self, collection: &str, key: &Key) -> Option<&Record> {
        self.collections.get(collection)?.get(key)
    }

    /// Returns the number of records in a collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, IndexMap::len)
    }

    /// Returns the total number of records.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.collections.values().map(IndexMap::len).sum()
    }

    /// Applies pending writes in order. Cannot fail.
    pub(crate) fn apply(&mut self, writes: impl IntoIterator<Item = (String, Key, PendingWrite)>) {
        for (collection, key, write) in writes {
            let records = self.collections.entry(collection).or_default();
            match write {
                PendingWrite::Put { record } => {
                    records.insert(key, record);
                }
                PendingWrite::Delete => {
                    records.shift_remove(&key);
                }
            }
        }
    }

    /// Replaces the whole content of a collection.
    pub(crate) fn replace_collection(&mut self, name: &str, records: IndexMap<Key, Record>) {
        self.collections.insert(name.to_string(), records);
    }

    /// Encodes the store as a compact image.
    pub(crate) fn to_image(&self) -> CoreResult<Vec<u8>> {
        let collections = self
            .collections
            .iter()
            .map(|(name, records)| (name.clone(), records.values().cloned().collect()))
            .collect();
        Ok(encode_image(&StoreImage::new(collections))?)
    }

    /// Rebuilds a store from an image.
    pub(crate) fn from_image(bytes: &[u8]) -> CoreResult<Self> {
        let image: StoreImage<Record> = decode_image(bytes)?;
        let collections = image
            .collections
            .into_iter()
            .map(|(name, records)| {
                let records = records
                    .into_iter()
                    .map(|record| (record.key().clone(), record))
                    .collect();
                (name, records)
            })
            .collect();
        Ok(Self { collections })
    }
}
