//! Loader and target whitelists per project type

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use versionflow::StageContext;

use crate::auth::AuthContext;
use crate::error::{PublisherError, Result};

/// Valid loaders, and optionally targets, for one project type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectTypeWhitelist {
    pub loaders: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<BTreeSet<String>>,
}

/// Source of the whitelists the loaders and targets stages validate against
#[async_trait]
pub trait WhitelistSource: Send + Sync {
    /// Whitelist for `project_type`, fetched with the caller's credentials
    async fn whitelist(&self, auth: &AuthContext, project_type: &str)
    -> Result<ProjectTypeWhitelist>;

    /// Build the stage context for a submission
    async fn stage_context(&self, auth: &AuthContext, project_type: &str) -> Result<StageContext> {
        let whitelist = self.whitelist(auth, project_type).await?;
        let ctx = StageContext::new().with_loaders(whitelist.loaders);
        Ok(match whitelist.targets {
            Some(targets) => ctx.with_targets(targets),
            None => ctx,
        })
    }
}

/// Whitelists held in memory, from the built-in table or a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StaticWhitelist {
    project_types: BTreeMap<String, ProjectTypeWhitelist>,
}

impl StaticWhitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaders each project type accepts out of the box
    pub fn builtin() -> Self {
        let mods = ["fabric", "forge", "neoforge", "quilt", "liteloader", "rift"];
        let plugins = [
            "bukkit", "spigot", "paper", "purpur", "folia", "sponge", "bungeecord", "velocity",
            "waterfall",
        ];
        Self::new()
            .with_project_type("mod", mods)
            .with_project_type("modpack", mods)
            .with_project_type("plugin", plugins)
            .with_project_type("resourcepack", ["minecraft"])
            .with_project_type("datapack", ["datapack"])
            .with_project_type("shader", ["iris", "optifine", "canvas", "vanilla"])
    }

    pub fn with_project_type<I, S>(mut self, project_type: impl Into<String>, loaders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_types.insert(
            project_type.into(),
            ProjectTypeWhitelist {
                loaders: loaders.into_iter().map(Into::into).collect(),
                targets: None,
            },
        );
        self
    }

    /// Restrict the targets accepted for an already registered project type
    pub fn with_targets<I, S>(mut self, project_type: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(entry) = self.project_types.get_mut(project_type) {
            entry.targets = Some(targets.into_iter().map(Into::into).collect());
        }
        self
    }

    /// Load a `{ "<project type>": { "loaders": [...], "targets": [...] } }` file
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn project_types(&self) -> impl Iterator<Item = &str> {
        self.project_types.keys().map(String::as_str)
    }
}

#[async_trait]
impl WhitelistSource for StaticWhitelist {
    async fn whitelist(
        &self,
        _auth: &AuthContext,
        project_type: &str,
    ) -> Result<ProjectTypeWhitelist> {
        self.project_types
            .get(project_type)
            .cloned()
            .ok_or_else(|| PublisherError::Whitelist {
                project_type: project_type.to_string(),
                reason: "unknown project type".to_string(),
            })
    }
}
