//! Error types for the publisher

use thiserror::Error;
use versionflow::{PipelineError, StageKey};

use crate::download::DownloadError;
use crate::storage::StorageError;

/// Publisher-level errors
#[derive(Error, Debug)]
pub enum PublisherError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("No whitelist for project type '{project_type}': {reason}")]
    Whitelist { project_type: String, reason: String },

    #[error("Version is incomplete, missing: {}", join_keys(.0))]
    Incomplete(Vec<StageKey>),

    #[error("Single-stage edit has not committed its stage")]
    EditNotFinished,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_keys(keys: &[StageKey]) -> String {
    keys.iter()
        .map(StageKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for publisher operations
pub type Result<T> = std::result::Result<T, PublisherError>;
