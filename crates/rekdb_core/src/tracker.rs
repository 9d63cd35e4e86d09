//! Per-kind request tracking for consumers of the store.
//!
//! An [`EntityTracker`] wraps every store call of one entity kind with a
//! status machine (`idle → loading → succeeded | failed`) and keeps a cached
//! list that is only reconciled after the store confirms a write.

use crate::collection::{Entity, EntityKind, KeyStrategy};
use crate::database::Database;
use crate::entity::{Attributes, Patch};
use crate::error::{CoreError, CoreResult};
use crate::types::Key;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Status of the latest request of a tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestStatus {
    /// No request made yet.
    #[default]
    Idle,
    /// A request is in progress.
    Loading,
    /// The latest request succeeded.
    Succeeded,
    /// The latest request failed.
    Failed,
}

/// Request bookkeeping of one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestState {
    /// Status of the latest request.
    pub status: RequestStatus,
    /// Error message of the latest failed request.
    pub error: Option<String>,
    /// Key assigned to the next sequentially keyed entity.
    pub next_id: i64,
}

impl Default for RequestState {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            error: None,
            next_id: 1,
        }
    }
}

/// Tracks requests and caches entities of kind `K`.
pub struct EntityTracker<K: EntityKind> {
    db: Arc<Database>,
    state: RequestState,
    items: Vec<Entity<K>>,
    status: watch::Sender<RequestStatus>,
}

impl<K: EntityKind> EntityTracker<K> {
    /// Creates an idle tracker with an empty cache.
    ///
    /// `next_id` starts past the largest integer key already stored.
    pub fn new(db: Arc<Database>) -> CoreResult<Self> {
        let next_id = next_free_key(&db, K::COLLECTION)?;
        let (status, _) = watch::channel(RequestStatus::Idle);
        Ok(Self {
            db,
            state: RequestState {
                next_id,
                ..RequestState::default()
            },
            items: Vec::new(),
            status,
        })
    }

    /// Returns the request state.
    #[must_use]
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Returns the cached entities.
    #[must_use]
    pub fn items(&self) -> &[Entity<K>] {
        &self.items
    }

    /// Subscribes to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestStatus> {
        self.status.subscribe()
    }

    /// Loads every entity, replacing the cache.
    ///
    /// Sets `next_id` past the largest integer key.
    pub async fn fetch_all(&mut self) -> CoreResult<&[Entity<K>]> {
        self.begin().await;
        let result = self.db.collection::<K>().list().and_then(|items| {
            let max = items.iter().filter_map(|entity| entity.id.as_int()).max();
            Ok((key_after(K::COLLECTION, max)?, items))
        });
        let (next_id, items) = self.finish(result)?;
        self.state.next_id = next_id;
        self.items = items;
        Ok(&self.items)
    }

    /// Adds an entity under a newly assigned key.
    ///
    /// Sequential kinds take `next_id`, or the key after the largest stored
    /// one if that is higher; other kinds get a generated key.
    pub async fn add(&mut self, body: K) -> CoreResult<Entity<K>> {
        self.begin().await;
        let result = self.insert(&body);
        let entity = self.finish(result)?;
        self.items.push(entity.clone());
        Ok(entity)
    }

    /// Merges `changes` onto an entity.
    pub async fn update(&mut self, key: Key, changes: Attributes) -> CoreResult<Entity<K>> {
        self.begin().await;
        let result = self.db.collection::<K>().update(Patch::new(key).merge(changes));
        let entity = self.finish(result)?;
        match self.items.iter_mut().find(|item| item.id == entity.id) {
            Some(item) => *item = entity.clone(),
            None => self.items.push(entity.clone()),
        }
        Ok(entity)
    }

    /// Deletes an entity.
    pub async fn remove(&mut self, key: &Key) -> CoreResult<()> {
        self.begin().await;
        let result = self.db.collection::<K>().delete(key);
        self.finish(result)?;
        self.items.retain(|item| &item.id != key);
        Ok(())
    }

    fn insert(&mut self, body: &K) -> CoreResult<Entity<K>> {
        let collection = self.db.collection::<K>();
        if K::KEYS == KeyStrategy::Generated {
            return collection.add(Key::generate(), body);
        }

        let key = self.state.next_id.max(next_free_key(&self.db, K::COLLECTION)?);
        let entity = match collection.add(key, body) {
            Err(CoreError::DuplicateKey { .. }) => {
                let key = next_free_key(&self.db, K::COLLECTION)?;
                debug!(collection = K::COLLECTION, key, "next id resynced");
                collection.add(key, body)?
            }
            other => other?,
        };
        if let Some(id) = entity.id.as_int() {
            self.state.next_id = id.saturating_add(1);
        }
        Ok(entity)
    }

    async fn begin(&mut self) {
        self.state.error = None;
        self.set_status(RequestStatus::Loading);
        // Let subscribers observe `Loading` before the store call runs.
        tokio::task::yield_now().await;
    }

    fn finish<T>(&mut self, result: CoreResult<T>) -> CoreResult<T> {
        match result {
            Ok(value) => {
                self.set_status(RequestStatus::Succeeded);
                Ok(value)
            }
            Err(e) => {
                warn!(collection = K::COLLECTION, error = %e, "request failed");
                self.state.error = Some(e.to_string());
                self.set_status(RequestStatus::Failed);
                Err(e)
            }
        }
    }

    fn set_status(&mut self, status: RequestStatus) {
        debug!(collection = K::COLLECTION, ?status, "request status");
        self.state.status = status;
        self.status.send_replace(status);
    }
}

/// Returns the key after the largest integer key of `collection`.
fn next_free_key(db: &Database, collection: &str) -> CoreResult<i64> {
    let max = db
        .get_all(collection)?
        .iter()
        .filter_map(|record| record.key().as_int())
        .max();
    key_after(collection, max)
}

fn key_after(collection: &str, max: Option<i64>) -> CoreResult<i64> {
    match max {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            CoreError::validation_failed(format!("integer keys of `{collection}` are exhausted"))
        }),
    }
}
