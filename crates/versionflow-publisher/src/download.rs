//! Download URL resolution for version files
//!
//! Paid files are stored under `private://` URLs and have to be exchanged for
//! a short-lived presigned URL through the API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use versionflow::VersionFile;

use crate::auth::AuthContext;

pub const PRIVATE_URL_PREFIX: &str = "private://";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DownloadError {
    #[error("File {filename} has not been uploaded yet")]
    NoUrl { filename: String },

    #[error("File {filename} has no hash to request a download with")]
    MissingHash { filename: String },

    #[error("Please log in to download this file")]
    LoginRequired,

    #[error("This file must be purchased before it can be downloaded")]
    PurchaseRequired,

    #[error("The file does not exist or was deleted")]
    FileNotFound,

    #[error("Server error, please try again later")]
    ServerError,

    #[error("Could not obtain a download link: {0}")]
    Request(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

/// Failure reported by a presign request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl From<PresignFailure> for DownloadError {
    fn from(failure: PresignFailure) -> Self {
        match failure.status {
            Some(401) => DownloadError::LoginRequired,
            Some(403) => DownloadError::PurchaseRequired,
            Some(404) => DownloadError::FileNotFound,
            Some(500) => DownloadError::ServerError,
            _ => DownloadError::Request(failure.message),
        }
    }
}

/// Exchanges a file hash for a presigned download URL
#[async_trait]
pub trait PresignClient: Send + Sync {
    async fn presign(
        &self,
        auth: &AuthContext,
        hash: &str,
        algorithm: HashAlgorithm,
    ) -> Result<String, PresignFailure>;
}

pub fn is_private_url(url: &str) -> bool {
    url.starts_with(PRIVATE_URL_PREFIX)
}

/// Hash used to request a private download, SHA-1 preferred
pub fn download_hash(file: &VersionFile) -> Option<(HashAlgorithm, &str)> {
    fn non_blank(hash: &Option<String>) -> Option<&str> {
        hash.as_deref().filter(|h| !h.trim().is_empty())
    }
    non_blank(&file.hashes.sha1)
        .map(|h| (HashAlgorithm::Sha1, h))
        .or_else(|| non_blank(&file.hashes.sha512).map(|h| (HashAlgorithm::Sha512, h)))
}

/// Link target for a download button; private files are handled by script
pub fn download_href(file: &VersionFile) -> Option<&str> {
    file.url
        .as_deref()
        .map(|url| if is_private_url(url) { "#" } else { url })
}

/// Resolve the URL a file can actually be downloaded from
pub async fn resolve_download_url(
    file: &VersionFile,
    auth: &AuthContext,
    client: &dyn PresignClient,
) -> Result<String, DownloadError> {
    let url = file.url.as_deref().ok_or_else(|| DownloadError::NoUrl {
        filename: file.filename.clone(),
    })?;
    if !is_private_url(url) {
        return Ok(url.to_string());
    }

    let (algorithm, hash) = download_hash(file).ok_or_else(|| DownloadError::MissingHash {
        filename: file.filename.clone(),
    })?;
    Ok(client.presign(auth, hash, algorithm).await?)
}
