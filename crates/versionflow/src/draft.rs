//! The draft version record assembled across stages

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::collections::BTreeSet;
use std::fmt;
use time::OffsetDateTime;

/// Identifier of a persisted version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionId(pub String);

impl From<String> for VersionId {
    fn from(s: String) -> Self {
        VersionId(s)
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        VersionId(s.to_string())
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hashes of an uploaded file, as hex strings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileHashes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,
}

impl FileHashes {
    /// Hashes with only a SHA-512 digest computed from the file bytes
    pub fn sha512_of(bytes: &[u8]) -> Self {
        let digest = Sha512::digest(bytes);
        Self {
            sha1: None,
            sha512: Some(format!("{:x}", digest)),
        }
    }

    /// Whether at least one non-blank hash is present
    pub fn has_any(&self) -> bool {
        [&self.sha1, &self.sha512]
            .into_iter()
            .flatten()
            .any(|h| !h.trim().is_empty())
    }
}

/// A file attached to a version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionFile {
    pub filename: String,
    /// Size in bytes
    pub size: u64,
    pub hashes: FileHashes,
    #[serde(default)]
    pub primary: bool,
    /// Download location once uploaded; `private://` for paid files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl VersionFile {
    /// Create a file descriptor with a single SHA-1 hash
    pub fn new(filename: impl Into<String>, size: u64, sha1: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            size,
            hashes: FileHashes {
                sha1: Some(sha1.into()),
                sha512: None,
            },
            primary: false,
            url: None,
            file_type: None,
        }
    }

    /// Mark this file as the primary download
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Set the download URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Release channel of a version
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    #[default]
    Release,
    Beta,
    Alpha,
}

/// Human-readable details of a version
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionDetails {
    pub name: String,
    #[serde(rename = "number")]
    pub version_number: String,
    pub channel: ReleaseChannel,
}

impl VersionDetails {
    pub fn new(
        name: impl Into<String>,
        version_number: impl Into<String>,
        channel: ReleaseChannel,
    ) -> Self {
        Self {
            name: name.into(),
            version_number: version_number.into(),
            channel,
        }
    }
}

/// Runtime environment compatibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    ClientOnly,
    ServerOnly,
    Both,
    Neither,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::ClientOnly => "client-only",
            Environment::ServerOnly => "server-only",
            Environment::Both => "both",
            Environment::Neither => "neither",
        }
    }
}

/// What a dependency points at
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DependencyTarget {
    /// Any version of a project
    Project(String),
    /// One specific version
    Version(String),
}

impl DependencyTarget {
    pub fn id(&self) -> &str {
        match self {
            DependencyTarget::Project(id) | DependencyTarget::Version(id) => id,
        }
    }
}

/// How a dependency relates to the version
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Required,
    Optional,
    Incompatible,
    Embedded,
}

/// A dependency reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    pub target: DependencyTarget,
    pub kind: DependencyKind,
}

impl Dependency {
    pub fn project(id: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            target: DependencyTarget::Project(id.into()),
            kind,
        }
    }

    pub fn version(id: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            target: DependencyTarget::Version(id.into()),
            kind,
        }
    }
}

/// The mutable record being assembled across stages
///
/// Fields are only written by stage commits inside this crate; persistence
/// collaborators use [`DraftVersion::assign_id`] and
/// [`DraftVersion::into_published`] for the session-boundary transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftVersion {
    #[serde(default)]
    pub(crate) id: Option<VersionId>,
    #[serde(default)]
    pub(crate) files: Vec<VersionFile>,
    #[serde(default)]
    pub(crate) details: VersionDetails,
    #[serde(default)]
    pub(crate) loaders: BTreeSet<String>,
    #[serde(default)]
    pub(crate) targets: BTreeSet<String>,
    #[serde(default)]
    pub(crate) environment: Option<Environment>,
    #[serde(default)]
    pub(crate) dependencies: Vec<Dependency>,
    #[serde(default)]
    pub(crate) changelog: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub(crate) published_at: Option<OffsetDateTime>,
}

impl DraftVersion {
    /// A fresh, never persisted draft
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&VersionId> {
        self.id.as_ref()
    }

    pub fn files(&self) -> &[VersionFile] {
        &self.files
    }

    /// The primary file, falling back to the first one
    pub fn primary_file(&self) -> Option<&VersionFile> {
        self.files
            .iter()
            .find(|f| f.primary)
            .or_else(|| self.files.first())
    }

    pub fn details(&self) -> &VersionDetails {
        &self.details
    }

    pub fn loaders(&self) -> &BTreeSet<String> {
        &self.loaders
    }

    pub fn targets(&self) -> &BTreeSet<String> {
        &self.targets
    }

    pub fn environment(&self) -> Option<Environment> {
        self.environment
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn changelog(&self) -> &str {
        &self.changelog
    }

    pub fn published_at(&self) -> Option<OffsetDateTime> {
        self.published_at
    }

    /// Published versions have an identifier and a publish timestamp
    pub fn is_published(&self) -> bool {
        self.id.is_some() && self.published_at.is_some()
    }

    /// Record the identifier handed out on first save
    pub fn assign_id(mut self, id: VersionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Mark the draft as published at the given instant
    pub fn into_published(mut self, id: VersionId, at: OffsetDateTime) -> Self {
        self.id = Some(id);
        self.published_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_sha512_of_known_input() {
        let hashes = FileHashes::sha512_of(b"abc");
        let digest = hashes.sha512.unwrap();
        assert_eq!(digest.len(), 128);
        assert!(digest.starts_with("ddaf35a193617aba"));
        assert!(hashes.sha1.is_none());
    }

    #[test]
    fn test_has_any_ignores_blank_hashes() {
        let blank = FileHashes {
            sha1: Some("  ".into()),
            sha512: None,
        };
        assert!(!blank.has_any());
        assert!(!FileHashes::default().has_any());
        assert!(VersionFile::new("a.jar", 1, "abc").hashes.has_any());
    }

    #[test]
    fn test_primary_file_falls_back_to_first() {
        let mut draft = DraftVersion::new();
        draft.files = vec![
            VersionFile::new("a.jar", 1, "a"),
            VersionFile::new("b.jar", 1, "b"),
        ];
        assert_eq!(draft.primary_file().unwrap().filename, "a.jar");

        draft.files[1].primary = true;
        assert_eq!(draft.primary_file().unwrap().filename, "b.jar");
    }

    #[test]
    fn test_published_requires_id_and_timestamp() {
        let draft = DraftVersion::new().assign_id("v1".into());
        assert!(!draft.is_published());

        let published = draft.into_published("v1".into(), datetime!(2024-01-01 0:00 UTC));
        assert!(published.is_published());
        assert_eq!(published.id().map(|id| id.as_ref()), Some("v1"));
    }

    #[test]
    fn test_environment_serializes_kebab_case() {
        let json = serde_json::to_string(&Environment::ServerOnly).unwrap();
        assert_eq!(json, "\"server-only\"");
        let parsed: Environment = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(parsed, Environment::Both);
    }
}
