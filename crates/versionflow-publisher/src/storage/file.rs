use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use versionflow::{DraftVersion, VersionId};

use super::{StorageError, VersionStore, new_version_id};

/// File-based store keeping one JSON document per version
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store rooted at `base_path`
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn versions_dir(&self) -> PathBuf {
        self.base_path.join("versions")
    }

    fn version_file(&self, id: &VersionId) -> Result<PathBuf, StorageError> {
        let valid = !id.0.is_empty()
            && id
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Backend(format!("invalid version id '{}'", id)));
        }
        Ok(self.versions_dir().join(format!("{}.json", id.0)))
    }
}

#[async_trait]
impl VersionStore for FileStore {
    async fn save(&self, draft: &DraftVersion) -> Result<VersionId, StorageError> {
        let (id, stored) = match draft.id() {
            Some(id) => (id.clone(), draft.clone()),
            None => {
                let id = new_version_id();
                (id.clone(), draft.clone().assign_id(id))
            }
        };
        let path = self.version_file(&id)?;

        fs::create_dir_all(self.versions_dir()).await?;
        let json = serde_json::to_vec_pretty(&stored)?;
        fs::write(&path, json).await?;

        debug!(id = %id, path = %path.display(), "version saved");
        Ok(id)
    }

    async fn load(&self, id: &VersionId) -> Result<DraftVersion, StorageError> {
        let path = self.version_file(id)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn list(&self) -> Result<Vec<VersionId>, StorageError> {
        let mut ids = Vec::new();
        let mut entries = match fs::read_dir(self.versions_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(VersionId::from(stem));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: &VersionId) -> Result<(), StorageError> {
        match fs::remove_file(self.version_file(id)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
