//! Transaction state.

use crate::collection::SchemaRegistry;
use crate::entity::{NewRecord, Patch, Record, RecordStore};
use crate::error::{CoreError, CoreResult};
use crate::transaction::Operation;
use crate::types::Key;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::trace;

/// Represents a pending write in a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    /// Insert or replace a record.
    Put {
        /// The record as it will be stored.
        record: Record,
    },
    /// Delete a record.
    Delete,
}

/// An active transaction.
///
/// Created by [`Database::transaction`](crate::Database::transaction) while
/// the database write lock is held. Every read consults the pending writes
/// first and then the committed store, so later steps observe earlier ones.
#[derive(Debug)]
pub struct Transaction<'a> {
    base: &'a RecordStore,
    schemas: &'a SchemaRegistry,
    scope: BTreeSet<String>,
    now: DateTime<Utc>,
    writes: IndexMap<(String, Key), PendingWrite>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(
        base: &'a RecordStore,
        schemas: &'a SchemaRegistry,
        scope: &[&str],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            base,
            schemas,
            scope: scope.iter().map(|name| (*name).to_string()).collect(),
            now,
            writes: IndexMap::new(),
        }
    }

    /// Timestamp applied to every write in this transaction.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Collections this transaction may touch.
    pub fn scope(&self) -> impl Iterator<Item = &str> {
        self.scope.iter().map(String::as_str)
    }

    /// Returns the number of pending writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Looks up a record, seeing this transaction's own writes.
    pub fn find(&self, collection: &str, key: &Key) -> CoreResult<Option<Record>> {
        self.check_scope(collection)?;
        Ok(self.lookup(collection, key))
    }

    /// Gets a record or fails with `NotFound`.
    pub fn get(&self, collection: &str, key: &Key) -> CoreResult<Record> {
        self.find(collection, key)?
            .ok_or_else(|| CoreError::not_found(collection, key.clone()))
    }

    /// Fails with `NotFound` unless the record exists.
    pub fn require(&self, collection: &str, key: &Key) -> CoreResult<()> {
        self.get(collection, key).map(|_| ())
    }

    /// Lists a collection as it would look after commit.
    pub fn list(&self, collection: &str) -> CoreResult<Vec<Record>> {
        self.check_scope(collection)?;
        let mut records: Vec<Record> = self
            .base
            .records(collection)
            .filter_map(|record| match self.pending(collection, record.key()) {
                Some(PendingWrite::Put { record }) => Some(record.clone()),
                Some(PendingWrite::Delete) => None,
                None => Some(record.clone()),
            })
            .collect();
        for ((name, key), write) in &self.writes {
            if name == collection && self.base.get(collection, key).is_none() {
                if let PendingWrite::Put { record } = write {
                    records.push(record.clone());
                }
            }
        }
        Ok(records)
    }

    /// Stages an insert. Fails with `DuplicateKey` if the key exists.
    pub fn add(&mut self, collection: &str, new: NewRecord) -> CoreResult<Record> {
        self.check_scope(collection)?;
        if self.lookup(collection, &new.key).is_some() {
            return Err(CoreError::duplicate_key(collection, new.key));
        }
        let record = Record::create(new.key, new.attributes, self.now);
        self.schemas.validate(collection, None, &record)?;
        self.stage(collection, record.clone());
        Ok(record)
    }

    /// Stages a merge upsert.
    ///
    /// Existing records keep their `createdAt` and every field the patch
    /// does not name. Absent records are created from the patch alone.
    pub fn put(&mut self, collection: &str, patch: Patch) -> CoreResult<Record> {
        self.check_scope(collection)?;
        let previous = self.lookup(collection, &patch.key);
        let record = match &previous {
            Some(existing) => existing.merged(&patch.attributes, self.now),
            None => Record::create(patch.key, patch.attributes, self.now),
        };
        self.schemas
            .validate(collection, previous.as_ref(), &record)?;
        self.stage(collection, record.clone());
        Ok(record)
    }

    /// Stages a delete. Absent keys are ignored.
    pub fn delete(&mut self, collection: &str, key: &Key) -> CoreResult<()> {
        self.check_scope(collection)?;
        if self.lookup(collection, key).is_some() {
            self.writes
                .insert((collection.to_string(), key.clone()), PendingWrite::Delete);
        }
        Ok(())
    }

    /// Executes a declarative operation.
    pub fn apply(&mut self, operation: Operation) -> CoreResult<()> {
        trace!(collection = operation.collection(), "applying operation");
        match operation {
            Operation::Add { collection, record } => self.add(&collection, record).map(|_| ()),
            Operation::Put { collection, patch } => self.put(&collection, patch).map(|_| ()),
            Operation::Delete { collection, key } => self.delete(&collection, &key),
            Operation::Require { collection, key } => self.require(&collection, &key),
        }
    }

    /// Consumes the transaction, yielding its writes in staging order.
    pub(crate) fn into_writes(self) -> Vec<(String, Key, PendingWrite)> {
        self.writes
            .into_iter()
            .map(|((collection, key), write)| (collection, key, write))
            .collect()
    }

    fn stage(&mut self, collection: &str, record: Record) {
        self.writes.insert(
            (collection.to_string(), record.key().clone()),
            PendingWrite::Put { record },
        );
    }

    fn pending(&self, collection: &str, key: &Key) -> Option<&PendingWrite> {
        self.writes.get(&(collection.to_string(), key.clone()))
    }

    fn lookup(&self, collection: &str, key: &Key) -> Option<Record> {
        match self.pending(collection, key) {
            Some(PendingWrite::Put { record }) => Some(record.clone()),
            Some(PendingWrite::Delete) => None,
            None => self.base.get(collection, key).cloned(),
        }
    }

    fn check_scope(&self, collection: &str) -> CoreResult<()> {
        if self.scope.contains(collection) {
            return Ok(());
        }
        let scope: Vec<&str> = self.scope().collect();
        Err(CoreError::validation_failed(format!(
            "collection `{collection}` is outside the transaction scope [{}]",
            scope.join(", ")
        )))
    }
}
