//! Publisher configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::auth::AuthContext;
use crate::error::{PublisherError, Result};
use crate::notify::MAIN_GROUP;

/// Publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Directory the file store writes versions into
    pub store_dir: PathBuf,

    /// Optional JSON whitelist replacing the built-in one
    pub whitelist_path: Option<PathBuf>,

    /// Token sent as the Authorization header
    pub api_token: Option<String>,

    /// Group notifications are posted to
    pub notify_group: String,
}

impl PublisherConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let notify_group = std::env::var("VERSIONFLOW_NOTIFY_GROUP")
            .unwrap_or(defaults.notify_group);
        if notify_group.trim().is_empty() {
            return Err(PublisherError::Config(
                "VERSIONFLOW_NOTIFY_GROUP must not be empty".to_string(),
            ));
        }

        Ok(Self {
            store_dir: std::env::var("VERSIONFLOW_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            whitelist_path: std::env::var("VERSIONFLOW_WHITELIST")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            api_token: std::env::var("VERSIONFLOW_API_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            notify_group,
        })
    }

    /// Credentials for API calls made on behalf of this process
    pub fn auth_context(&self) -> AuthContext {
        match &self.api_token {
            Some(token) => AuthContext::with_token(token.clone()),
            None => AuthContext::anonymous(),
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("./versionflow-data"),
            whitelist_path: None,
            api_token: None,
            notify_group: MAIN_GROUP.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PublisherConfig::default();
        assert_eq!(config.notify_group, "main");
        assert_eq!(config.store_dir, PathBuf::from("./versionflow-data"));
        assert!(!config.auth_context().is_authenticated());
    }

    #[test]
    fn test_token_becomes_auth_header() {
        let config = PublisherConfig {
            api_token: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(config.auth_context().token(), Some("secret"));
    }
}
