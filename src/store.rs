//! Entity store — the application state tree and its scoped slice accessors.
//!
//! DESIGN
//! ======
//! `Store` is an explicit, injected handle (never a module-level singleton)
//! over the full dashboard state: named collections plus singleton
//! configuration records. It is cheap to clone and safe to hand to every
//! panel. Each collection sits behind its own `Arc`, so committing an update
//! to one slice leaves every other slice referentially unchanged — consumers
//! check `Arc::ptr_eq` to skip recomputing derived views.
//!
//! ERROR HANDLING
//! ==============
//! Mutations against an uninitialized store (loader still in flight) are
//! dropped with a logged diagnostic. A panel firing too early must never
//! crash the dashboard, and store operations are otherwise total: a missing
//! collection reads as empty and is created on first write.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};

use crate::collection::Collection;
use crate::record::{Record, RecordId};

// =============================================================================
// APP DATA
// =============================================================================

/// Full dashboard state: collection name → records, plus singleton slices
/// (site identity, login page config, admin profile).
#[derive(Debug, Clone, Default)]
pub struct AppData {
    collections: HashMap<String, Arc<Collection>>,
    singletons: HashMap<String, Arc<Record>>,
}

impl AppData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style collection seeding.
    #[must_use]
    pub fn with_collection(mut self, name: impl Into<String>, collection: Collection) -> Self {
        self.collections.insert(name.into(), Arc::new(collection));
        self
    }

    /// Builder-style singleton seeding.
    #[must_use]
    pub fn with_singleton(mut self, name: impl Into<String>, record: Record) -> Self {
        self.singletons.insert(name.into(), Arc::new(record));
        self
    }

    #[must_use]
    pub fn collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.get(name).cloned()
    }

    #[must_use]
    pub fn singleton(&self, name: &str) -> Option<Arc<Record>> {
        self.singletons.get(name).cloned()
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

// =============================================================================
// SLICE UPDATE
// =============================================================================

/// One mutation against a single collection: either a wholesale replacement
/// or a pure function of the previous value.
pub enum SliceUpdate {
    Replace(Collection),
    Update(Box<dyn FnOnce(&Collection) -> Collection + Send>),
}

impl SliceUpdate {
    fn apply(self, prev: &Collection) -> Collection {
        match self {
            Self::Replace(next) => next,
            Self::Update(f) => f(prev),
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Shared handle over the application state. Clone freely — all panels see
/// the same tree. Reads return snapshots valid until the next commit; writes
/// go through [`SliceUpdate`] and complete before the next one is admitted.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<RwLock<Option<AppData>>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Store {
    /// Create an uninitialized store. Mutations are dropped until
    /// [`Store::initialize`] installs the loader's snapshot.
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self { inner: Arc::new(RwLock::new(None)), revision: Arc::new(revision) }
    }

    /// Install the initial snapshot from the loader boundary.
    pub async fn initialize(&self, data: AppData) {
        *self.inner.write().await = Some(data);
        self.bump();
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Snapshot of one collection. Missing names (or an uninitialized store)
    /// read as empty.
    pub async fn slice(&self, name: &str) -> Arc<Collection> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .and_then(|data| data.collection(name))
            .unwrap_or_default()
    }

    /// Apply one mutation to exactly one collection.
    ///
    /// Every other collection keeps its `Arc`. Returns `false` when the store
    /// is uninitialized and the mutation was dropped.
    pub async fn apply(&self, name: &str, update: SliceUpdate) -> bool {
        let mut guard = self.inner.write().await;
        let Some(data) = guard.as_mut() else {
            warn!(collection = name, "store: mutation dropped, state not initialized");
            return false;
        };

        let prev = data.collections.get(name).cloned().unwrap_or_default();
        let next = update.apply(&prev);
        debug!(collection = name, prev_len = prev.len(), next_len = next.len(), "store: slice committed");
        data.collections.insert(name.to_string(), Arc::new(next));
        drop(guard);

        self.bump();
        true
    }

    /// Replace a collection wholesale.
    pub async fn replace_slice(&self, name: &str, collection: Collection) -> bool {
        self.apply(name, SliceUpdate::Replace(collection)).await
    }

    /// Derive the next collection value from the previous one.
    pub async fn update_slice<F>(&self, name: &str, f: F) -> bool
    where
        F: FnOnce(&Collection) -> Collection + Send + 'static,
    {
        self.apply(name, SliceUpdate::Update(Box::new(f))).await
    }

    /// Upsert one record through the shared protocol.
    pub async fn upsert(&self, name: &str, record: Record) -> bool {
        self.update_slice(name, move |prev| prev.upsert(record)).await
    }

    /// Remove one record by id. Missing ids are a no-op inside the protocol.
    pub async fn remove(&self, name: &str, id: RecordId) -> bool {
        self.update_slice(name, move |prev| prev.remove(&id)).await
    }

    // =========================================================================
    // SINGLETON SLICES
    // =========================================================================

    pub async fn singleton(&self, name: &str) -> Option<Arc<Record>> {
        let guard = self.inner.read().await;
        guard.as_ref().and_then(|data| data.singleton(name))
    }

    /// Replace a singleton configuration record.
    pub async fn set_singleton(&self, name: &str, record: Record) -> bool {
        let mut guard = self.inner.write().await;
        let Some(data) = guard.as_mut() else {
            warn!(singleton = name, "store: mutation dropped, state not initialized");
            return false;
        };
        data.singletons.insert(name.to_string(), Arc::new(record));
        drop(guard);

        self.bump();
        true
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    /// Clone of the full state for autosave observers. `None` until
    /// initialized.
    pub async fn snapshot(&self) -> Option<AppData> {
        self.inner.read().await.clone()
    }

    /// Watch the revision counter. Bumps once per committed mutation, so an
    /// external persistence observer can debounce snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
