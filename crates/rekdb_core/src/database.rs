//! Database facade.

use crate::backup;
use crate::clock::{Clock, SystemClock};
use crate::collection::{Collection, EntityKind, SchemaRegistry};
use crate::config::Config;
use crate::domain::domain_schemas;
use crate::entity::{NewRecord, Patch, Record, RecordStore};
use crate::error::{CoreError, CoreResult};
use crate::transaction::{Operation, PendingWrite, Transaction};
use crate::types::{Key, BACKUPS};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};
use rekdb_codec::{decode_document, encode_document, CodecError, ExportDocument};
use rekdb_storage::StorageBackend;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The main database handle.
///
/// `Database` owns every collection for its lifetime. It provides:
/// - Record CRUD on named collections
/// - Multi-collection transactions
/// - Export and import of the whole store
/// - Typed collections over registered entity kinds
///
/// Share it between components as `Arc<Database>`. Every operation is a
/// synchronous in-process call behind a read-write lock; mutations hold the
/// write lock from the first read of a transaction until its commit.
///
/// # Example
///
/// ```rust
/// use rekdb_core::{Database, NewRecord, Patch};
/// use serde_json::json;
///
/// let db = Database::open_in_memory().unwrap();
/// db.add("expenses", NewRecord::from_value("e1", json!({"amount": 40})).unwrap())
///     .unwrap();
/// db.put("expenses", Patch::new("e1").set("paid", true)).unwrap();
///
/// let expense = db.get("expenses", &"e1".into()).unwrap();
/// assert_eq!(expense.get("amount"), Some(&json!(40)));
/// assert_eq!(expense.get("paid"), Some(&json!(true)));
/// ```
pub struct Database {
    /// Configuration.
    config: Config,
    /// Timestamp source.
    clock: Arc<dyn Clock>,
    /// Write validation by collection.
    schemas: SchemaRegistry,
    /// Store, backend and lifecycle flag.
    state: RwLock<DatabaseState>,
}

struct DatabaseState {
    store: RecordStore,
    backend: Option<Box<dyn StorageBackend>>,
    is_open: bool,
}

impl DatabaseState {
    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(CoreError::DatabaseClosed)
        }
    }

    /// Applies writes, persisting the resulting image first when backed.
    fn commit(&mut self, writes: Vec<(String, Key, PendingWrite)>) -> CoreResult<()> {
        if self.backend.is_none() {
            self.store.apply(writes);
            return Ok(());
        }
        let mut next = self.store.clone();
        next.apply(writes);
        self.swap(next)
    }

    /// Replaces the store once the backend (if any) holds the new image.
    fn swap(&mut self, next: RecordStore) -> CoreResult<()> {
        if let Some(backend) = self.backend.as_mut() {
            let image = next.to_image()?;
            backend.replace(&image)?;
        }
        self.store = next;
        Ok(())
    }
}

impl Database {
    /// Opens an in-memory database with default configuration.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open_in_memory_with_config(Config::default())
    }

    /// Opens an in-memory database.
    pub fn open_in_memory_with_config(config: Config) -> CoreResult<Self> {
        Ok(Self::from_parts(RecordStore::new(), None, config))
    }

    /// Opens a database over a storage backend.
    ///
    /// Loads the stored image if the backend has one. Every committed
    /// mutation afterwards rewrites the image before it becomes visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or holds an image that
    /// does not decode.
    pub fn open(backend: Box<dyn StorageBackend>, config: Config) -> CoreResult<Self> {
        let store = match backend.load()? {
            Some(image) => RecordStore::from_image(&image)?,
            None => RecordStore::new(),
        };
        Ok(Self::from_parts(store, Some(backend), config))
    }

    fn from_parts(
        mut store: RecordStore,
        backend: Option<Box<dyn StorageBackend>>,
        config: Config,
    ) -> Self {
        for name in &config.collections {
            store.declare(name);
        }
        let schemas = if config.enforce_schemas {
            domain_schemas()
        } else {
            SchemaRegistry::new()
        };
        info!(
            records = store.total_len(),
            persistent = backend.is_some(),
            "database opened"
        );
        Self {
            config,
            clock: Arc::new(SystemClock),
            schemas,
            state: RwLock::new(DatabaseState {
                store,
                backend,
                is_open: true,
            }),
        }
    }

    /// Replaces the clock used for timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the schema registry.
    #[must_use]
    pub fn with_schemas(mut self, schemas: SchemaRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    /// Closes the database. Later operations fail with `DatabaseClosed`.
    pub fn close(&self) -> CoreResult<()> {
        let mut state = self.state.write();
        if !state.is_open {
            return Ok(());
        }
        state.is_open = false;
        info!("database closed");
        Ok(())
    }

    /// Checks if the database is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.read().is_open
    }

    /// Returns database configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the current time of the database clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, DatabaseState>> {
        let state = self.state.read();
        state.ensure_open()?;
        Ok(state)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns collection names in declaration order.
    pub fn collection_names(&self) -> CoreResult<Vec<String>> {
        Ok(self
            .read()?
            .store
            .collection_names()
            .map(String::from)
            .collect())
    }

    /// Returns every record in a collection, in insertion order.
    pub fn get_all(&self, collection: &str) -> CoreResult<Vec<Record>> {
        Ok(self.read()?.store.get_all(collection))
    }

    /// Gets a record by key.
    pub fn get(&self, collection: &str, key: &Key) -> CoreResult<Record> {
        self.read()?
            .store
            .get(collection, key)
            .cloned()
            .ok_or_else(|| CoreError::not_found(collection, key.clone()))
    }

    /// Returns the number of records in a collection.
    pub fn count(&self, collection: &str) -> CoreResult<usize> {
        Ok(self.read()?.store.len(collection))
    }

    /// Returns the size of the persisted image, or 0 when in memory.
    pub fn storage_size(&self) -> CoreResult<u64> {
        let state = self.read()?;
        match &state.backend {
            Some(backend) => Ok(backend.size()?),
            None => Ok(0),
        }
    }

    /// Returns a typed handle over the collection of `K`.
    #[must_use]
    pub fn collection<K: EntityKind>(&self) -> Collection<'_, K> {
        Collection::new(self)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Inserts a record, stamping `createdAt` and `updatedAt`.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` if the key exists, `ValidationFailed` if the collection
    /// schema rejects the record.
    pub fn add(&self, collection: &str, record: NewRecord) -> CoreResult<Record> {
        debug!(collection, key = %record.key, "add");
        self.execute(&[collection], false, |txn| txn.add(collection, record))
    }

    /// Merge-upserts a record.
    ///
    /// Fields named by the patch overwrite stored ones; every other field
    /// and `createdAt` are kept, `updatedAt` is refreshed. An absent record
    /// is created from the patch.
    pub fn put(&self, collection: &str, patch: Patch) -> CoreResult<Record> {
        debug!(collection, key = %patch.key, "put");
        self.execute(&[collection], false, |txn| txn.put(collection, patch))
    }

    /// Deletes a record. Deleting an absent key is not an error.
    pub fn delete(&self, collection: &str, key: &Key) -> CoreResult<()> {
        debug!(collection, %key, "delete");
        self.execute(&[collection], false, |txn| txn.delete(collection, key))
    }

    /// Runs `f` in a transaction over `scope`.
    ///
    /// Commits if `f` returns `Ok`; otherwise nothing `f` staged becomes
    /// visible and the error is returned as `TransactionAborted`.
    ///
    /// ```rust
    /// use rekdb_core::{CoreError, Database, NewRecord};
    /// use serde_json::json;
    ///
    /// let db = Database::open_in_memory().unwrap();
    /// let result = db.transaction(&["expenses"], |txn| {
    ///     txn.add("expenses", NewRecord::from_value("e1", json!({}))?)?;
    ///     txn.require("expenses", &"e2".into())
    /// });
    ///
    /// assert!(matches!(result, Err(CoreError::TransactionAborted { .. })));
    /// assert_eq!(db.count("expenses").unwrap(), 0);
    /// ```
    pub fn transaction<F, T>(&self, scope: &[&str], f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    {
        self.execute(scope, true, f)
    }

    /// Runs declarative operations, in order, in one transaction.
    pub fn run_transaction(&self, scope: &[&str], operations: Vec<Operation>) -> CoreResult<()> {
        debug!(?scope, operations = operations.len(), "run transaction");
        self.transaction(scope, |txn| {
            for operation in operations {
                txn.apply(operation)?;
            }
            Ok(())
        })
    }

    fn execute<F, T>(&self, scope: &[&str], abort_wraps: bool, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    {
        let mut state = self.state.write();
        state.ensure_open()?;

        let mut txn = Transaction::new(&state.store, &self.schemas, scope, self.clock.now());
        let value = match f(&mut txn) {
            Ok(value) => value,
            Err(e) if abort_wraps => {
                debug!(error = %e, "transaction aborted");
                return Err(CoreError::transaction_aborted(e));
            }
            Err(e) => return Err(e),
        };
        let writes = txn.into_writes();

        if !writes.is_empty() {
            state.commit(writes)?;
        }
        Ok(value)
    }

    // ========================================================================
    // Export and Import
    // ========================================================================

    /// Builds the export document of the current state.
    ///
    /// Holds every collection except `backups`, whose records appear only
    /// as metadata summaries.
    pub fn export_document(&self) -> CoreResult<ExportDocument<Record>> {
        let state = self.read()?;
        let mut document = ExportDocument::new();
        for name in state.store.collection_names() {
            if name != BACKUPS {
                document.insert_collection(name, state.store.get_all(name));
            }
        }
        document.backups_metadata = state
            .store
            .records(BACKUPS)
            .filter_map(backup::summarize)
            .collect();
        Ok(document)
    }

    /// Encodes the export document.
    pub fn export(&self) -> CoreResult<Vec<u8>> {
        Ok(encode_document(&self.export_document()?)?)
    }

    /// Replaces every collection present in an encoded export document.
    ///
    /// The document is decoded completely before anything changes; a decode
    /// failure leaves the store untouched. Collections the document does
    /// not mention are kept.
    pub fn import(&self, bytes: &[u8]) -> CoreResult<()> {
        let document: ExportDocument<Record> = decode_document(bytes)?;
        let replaced = self.replace_collections(document.collections)?;
        info!(collections = replaced, "import completed");
        Ok(())
    }

    /// Swaps whole collections in one step. Returns how many were replaced.
    pub(crate) fn replace_collections(
        &self,
        collections: IndexMap<String, Vec<Record>>,
    ) -> CoreResult<usize> {
        let mut staged = Vec::with_capacity(collections.len());
        for (name, records) in collections {
            if name == BACKUPS {
                warn!("ignoring backups collection in export document");
                continue;
            }
            let mut by_key = IndexMap::with_capacity(records.len());
            for record in records {
                let key = record.key().clone();
                if by_key.insert(key.clone(), record).is_some() {
                    return Err(CodecError::parse_error(format!(
                        "duplicate key {key} in collection {name}"
                    ))
                    .into());
                }
            }
            staged.push((name, by_key));
        }

        let mut state = self.state.write();
        state.ensure_open()?;
        let mut next = state.store.clone();
        let replaced = staged.len();
        for (name, records) in staged {
            next.replace_collection(&name, records);
        }
        state.swap(next)?;
        Ok(replaced)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("schemas", &self.schemas)
            .field("is_open", &self.is_open())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::{CLIENTS, EXPENSES};
    use chrono::{Duration, TimeZone};
    use rekdb_storage::InMemoryBackend;
    use serde_json::json;

    fn clocked() -> (Database, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        ));
        let db = Database::open_in_memory().unwrap().with_clock(clock.clone());
        (db, clock)
    }

    fn expense(key: &str, amount: i64) -> NewRecord {
        NewRecord::from_value(key, json!({ "amount": amount })).unwrap()
    }

    #[test]
    fn declared_collections_exist_on_open() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(
            db.collection_names().unwrap(),
            vec!["clients", "machines", "collections", "expenses", "backups"]
        );
    }

    #[test]
    fn add_stamps_timestamps() {
        let (db, clock) = clocked();
        let record = db.add(EXPENSES, expense("e1", 10)).unwrap();
        assert_eq!(record.created_at(), clock.now());
        assert_eq!(record.updated_at(), clock.now());
        assert_eq!(db.get(EXPENSES, &"e1".into()).unwrap(), record);
    }

    #[test]
    fn put_merges_and_preserves_created_at() {
        let (db, clock) = clocked();
        let created = db.add(EXPENSES, expense("e1", 10)).unwrap();

        clock.advance(Duration::minutes(5));
        let updated = db
            .put(EXPENSES, Patch::new("e1").set("note", "fuel"))
            .unwrap();

        assert_eq!(updated.get("amount"), Some(&json!(10)));
        assert_eq!(updated.get("note"), Some(&json!("fuel")));
        assert_eq!(updated.created_at(), created.created_at());
        assert_eq!(updated.updated_at(), clock.now());
    }

    #[test]
    fn put_creates_absent_record() {
        let (db, _) = clocked();
        let record = db
            .put(EXPENSES, Patch::new("e9").set("amount", 1))
            .unwrap();
        assert_eq!(record.created_at(), record.updated_at());
        assert_eq!(db.count(EXPENSES).unwrap(), 1);
    }

    #[test]
    fn writes_create_unknown_collections() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_all("routes").unwrap().is_empty());
        db.add("routes", expense("r1", 0)).unwrap();
        assert!(db
            .collection_names()
            .unwrap()
            .contains(&"routes".to_string()));
    }

    #[test]
    fn closed_database_rejects_operations() {
        let db = Database::open_in_memory().unwrap();
        db.close().unwrap();
        db.close().unwrap();

        assert!(!db.is_open());
        assert!(matches!(db.get_all(EXPENSES), Err(CoreError::DatabaseClosed)));
        assert!(matches!(
            db.add(EXPENSES, expense("e1", 1)),
            Err(CoreError::DatabaseClosed)
        ));
    }

    #[test]
    fn schema_boundary_can_be_disabled() {
        let strict = Database::open_in_memory().unwrap();
        let err = strict
            .add(CLIENTS, NewRecord::from_value(1, json!({"name": "X"})).unwrap())
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));

        let lax = Database::open_in_memory_with_config(Config::new().enforce_schemas(false))
            .unwrap();
        lax.add(CLIENTS, NewRecord::from_value(1, json!({"name": "X"})).unwrap())
            .unwrap();
    }

    #[test]
    fn backend_receives_image_on_commit() {
        let backend = InMemoryBackend::new();
        let db = Database::open(Box::new(backend.clone()), Config::default()).unwrap();
        db.add(EXPENSES, expense("e1", 10)).unwrap();

        let image = backend.image().unwrap();
        let reopened = Database::open(Box::new(InMemoryBackend::with_image(image)), Config::default())
            .unwrap();
        assert_eq!(
            reopened.get(EXPENSES, &"e1".into()).unwrap(),
            db.get(EXPENSES, &"e1".into()).unwrap()
        );
    }

    #[test]
    fn export_import_roundtrip() {
        let (db, _) = clocked();
        db.add(EXPENSES, expense("e1", 10)).unwrap();
        db.add(EXPENSES, expense("e2", 20)).unwrap();
        let bytes = db.export().unwrap();

        db.delete(EXPENSES, &"e1".into()).unwrap();
        db.add(EXPENSES, expense("e3", 30)).unwrap();
        db.import(&bytes).unwrap();

        let keys: Vec<Key> = db
            .get_all(EXPENSES)
            .unwrap()
            .iter()
            .map(|r| r.key().clone())
            .collect();
        assert_eq!(keys, vec![Key::from("e1"), Key::from("e2")]);
    }

    #[test]
    fn malformed_import_leaves_store_untouched() {
        let (db, _) = clocked();
        db.add(EXPENSES, expense("e1", 10)).unwrap();

        let err = db.import(b"{\"expenses\": [").unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::ParseError { .. })));
        assert_eq!(db.count(EXPENSES).unwrap(), 1);
    }

    #[test]
    fn import_rejects_duplicate_keys() {
        let (db, _) = clocked();
        let document = json!({
            "version": "1.0",
            "expenses": [
                {"id": "e1", "createdAt": "2024-03-01T10:00:00Z", "updatedAt": "2024-03-01T10:00:00Z"},
                {"id": "e1", "createdAt": "2024-03-01T10:00:00Z", "updatedAt": "2024-03-01T10:00:00Z"}
            ]
        });
        let err = db
            .import(&serde_json::to_vec(&document).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("duplicate key e1"));
    }
}
