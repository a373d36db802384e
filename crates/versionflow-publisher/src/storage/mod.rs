//! Persistence of draft and published versions
//!
//! Stores are only touched at session boundaries: first save, final submit
//! and the load that opens a single-stage edit.

use async_trait::async_trait;
use versionflow::{DraftVersion, VersionId};

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Version not found: {0}")]
    NotFound(VersionId),

    #[error("Version {0} has not been published")]
    NotPublished(VersionId),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over version persistence backends
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Store a draft, assigning a fresh identifier when it has none
    async fn save(&self, draft: &DraftVersion) -> Result<VersionId, StorageError>;

    /// Load a stored version regardless of its state
    async fn load(&self, id: &VersionId) -> Result<DraftVersion, StorageError>;

    /// Identifiers of every stored version
    async fn list(&self) -> Result<Vec<VersionId>, StorageError>;

    /// Delete a stored version
    async fn delete(&self, id: &VersionId) -> Result<(), StorageError>;

    /// Load a version that has been published
    async fn load_published(&self, id: &VersionId) -> Result<DraftVersion, StorageError> {
        let draft = self.load(id).await?;
        if draft.is_published() {
            Ok(draft)
        } else {
            Err(StorageError::NotPublished(id.clone()))
        }
    }
}

/// Generate an identifier for a version saved for the first time
pub(crate) fn new_version_id() -> VersionId {
    VersionId(uuid::Uuid::new_v4().to_string())
}
