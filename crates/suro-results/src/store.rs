//! # Result Store
//!
//! The persistence seam of the pipeline. The orchestrator reads the run and
//! its model and writes one binary attachment per produced artifact through
//! [`ResultStore`]. How attachments are physically kept is up to the
//! implementation.
//!
//! [`InMemoryStore`] keeps everything in process memory behind
//! `parking_lot` locks. It is cloneable and every clone shares the same data.
//! Writing an attachment twice under the same name replaces the first.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;

use suro_core::{Attachment, Model, ModelId, Run, RunId};

use crate::error::{StoreError, StoreResult};

/// Entity lookups and attachment writes needed by the orchestrator.
pub trait ResultStore: Send + Sync {
    /// Look up a run.
    fn get_run(&self, id: &RunId) -> StoreResult<Option<Run>>;

    /// Look up a model.
    fn get_model(&self, id: &ModelId) -> StoreResult<Option<Model>>;

    /// Store `bytes` on `run` under `file_name`.
    fn attach_as_bytes(
        &self,
        run: &RunId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StoreResult<()>;
}

// -- Generic In-Memory Map ----------------------------------------------------

/// Thread-safe, cloneable in-memory key-value map.
///
/// All operations are synchronous and never hold the lock beyond the call.
#[derive(Debug)]
pub struct Store<K, V> {
    data: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Store<K, V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: V) -> Option<V> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &K) -> Option<V> {
        self.data.read().get(id).cloned()
    }

    /// Update a record in place. Returns the closure's result, or `None` if
    /// not found.
    pub fn update<R>(&self, id: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        self.data.write().get_mut(id).map(f)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &K) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V: Clone> Default for Store<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// -- In-Memory Result Store ---------------------------------------------------

/// Runs, models, and attachments held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    runs: Store<RunId, Run>,
    models: Store<ModelId, Model>,
    attachments: Store<RunId, IndexMap<String, Attachment>>,
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a model.
    pub fn insert_model(&self, model: Model) {
        self.models.insert(model.id, model);
    }

    /// Add or replace a run.
    pub fn insert_run(&self, run: Run) {
        if !self.attachments.contains(&run.id) {
            self.attachments.insert(run.id, IndexMap::new());
        }
        self.runs.insert(run.id, run);
    }

    /// One attachment of a run.
    pub fn attachment(&self, run: &RunId, file_name: &str) -> Option<Attachment> {
        self.attachments
            .get(run)
            .and_then(|files| files.get(file_name).cloned())
    }

    /// All attachments of a run, in first-write order.
    pub fn attachments(&self, run: &RunId) -> Vec<Attachment> {
        self.attachments
            .get(run)
            .map(|files| files.into_values().collect())
            .unwrap_or_default()
    }
}

impl ResultStore for InMemoryStore {
    fn get_run(&self, id: &RunId) -> StoreResult<Option<Run>> {
        Ok(self.runs.get(id))
    }

    fn get_model(&self, id: &ModelId) -> StoreResult<Option<Model>> {
        Ok(self.models.get(id))
    }

    fn attach_as_bytes(
        &self,
        run: &RunId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StoreResult<()> {
        let attachment = Attachment {
            name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
            stored_at: Utc::now(),
        };
        self.attachments
            .update(run, |files| {
                files.insert(file_name.to_string(), attachment);
            })
            .ok_or(StoreError::RunNotFound(*run))
    }
}
