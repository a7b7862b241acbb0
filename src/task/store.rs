//! Concurrency-safe map from task id to task record.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::TaskRecord;
use crate::error::{Error, Result};
use crate::types::{Quality, TaskId};

/// Shared task store
///
/// A single lock guards the whole map. Critical sections are short and
/// never await or touch the filesystem, so handlers, workers and the
/// retention sweep can share it freely.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh pending record and return its id
    pub fn create(&self, url: impl Into<String>, quality: Quality) -> TaskId {
        let record = TaskRecord::new(url, quality);
        let mut tasks = self.write();
        loop {
            let id = TaskId::generate();
            if !tasks.contains_key(&id) {
                tasks.insert(id.clone(), record);
                return id;
            }
        }
    }

    /// Insert a record under a caller-chosen id, replacing nothing
    ///
    /// Returns `false` if the id is already taken.
    pub fn insert(&self, id: TaskId, record: TaskRecord) -> bool {
        let mut tasks = self.write();
        if tasks.contains_key(&id) {
            return false;
        }
        tasks.insert(id, record);
        true
    }

    /// Snapshot of a record
    pub fn get(&self, id: &TaskId) -> Result<TaskRecord> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Whether a record exists
    pub fn contains(&self, id: &TaskId) -> bool {
        self.read().contains_key(id)
    }

    /// Remove a record, returning it if it existed
    pub fn delete(&self, id: &TaskId) -> Option<TaskRecord> {
        self.write().remove(id)
    }

    /// Snapshot of all ids currently stored
    pub fn list_ids(&self) -> Vec<TaskId> {
        self.read().keys().cloned().collect()
    }

    /// Run `f` against a record under the write lock
    ///
    /// `f` must not block; the lock is held for its whole duration.
    pub fn update<R>(&self, id: &TaskId, f: impl FnOnce(&mut TaskRecord) -> R) -> Result<R> {
        let mut tasks = self.write();
        let record = tasks
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(f(record))
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every mutation leaves the map consistent, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<TaskId, TaskRecord>> {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TaskId, TaskRecord>> {
        self.tasks.write().unwrap_or_else(PoisonError::into_inner)
    }
}
