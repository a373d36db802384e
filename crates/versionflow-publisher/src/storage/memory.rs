use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use versionflow::{DraftVersion, VersionId};

use super::{StorageError, VersionStore, new_version_id};

/// In-memory store for testing and development
#[derive(Debug, Default)]
pub struct MemoryStore {
    versions: Mutex<HashMap<VersionId, DraftVersion>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored versions
    pub fn len(&self) -> usize {
        self.versions.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<VersionId, DraftVersion>>, StorageError> {
        self.versions
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn save(&self, draft: &DraftVersion) -> Result<VersionId, StorageError> {
        let (id, stored) = match draft.id() {
            Some(id) => (id.clone(), draft.clone()),
            None => {
                let id = new_version_id();
                (id.clone(), draft.clone().assign_id(id))
            }
        };
        self.lock()?.insert(id.clone(), stored);
        Ok(id)
    }

    async fn load(&self, id: &VersionId) -> Result<DraftVersion, StorageError> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    async fn list(&self) -> Result<Vec<VersionId>, StorageError> {
        let mut ids: Vec<_> = self.lock()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: &VersionId) -> Result<(), StorageError> {
        self.lock()?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }
}
