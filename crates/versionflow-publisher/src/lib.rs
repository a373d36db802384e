//! # Versionflow Publisher
//!
//! The collaborators around the [`versionflow`] pipeline:
//! - Version persistence ([`VersionStore`]) with memory and file backends
//! - Loader and target whitelists per project type ([`WhitelistSource`])
//! - User-facing notifications ([`NotificationSink`])
//! - Private download URL resolution
//! - [`Publisher`], which calls all of the above only at session boundaries
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use versionflow::{StageInput, VersionFile};
//! use versionflow_publisher::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let publisher = Publisher::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(StaticWhitelist::builtin()),
//!     Arc::new(TracingSink),
//! );
//! let auth = AuthContext::with_token("token");
//!
//! let mut session = publisher.begin_wizard("mod")?;
//! publisher
//!     .submit(
//!         &mut session,
//!         StageInput::Files(vec![VersionFile::new("mod.jar", 1024, "abc")]),
//!         &auth,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod download;
pub mod error;
pub mod notify;
pub mod publisher;
pub mod storage;
pub mod whitelist;

pub use auth::AuthContext;
pub use config::PublisherConfig;
pub use download::{
    DownloadError, HashAlgorithm, PresignClient, PresignFailure, download_href, is_private_url,
    resolve_download_url,
};
pub use error::{PublisherError, Result};
pub use notify::{
    ApiFailure, Notification, NotificationKind, NotificationSink, RecordingSink, TracingSink,
};
pub use publisher::{PublishSession, Publisher};
pub use storage::{FileStore, MemoryStore, StorageError, VersionStore};
pub use whitelist::{ProjectTypeWhitelist, StaticWhitelist, WhitelistSource};
