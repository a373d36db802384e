//! Stage keys, inputs and declarative stage definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::draft::{Dependency, DraftVersion, Environment, VersionDetails, VersionFile};
use crate::error::{PipelineError, Result, ValidationErrors};

/// Stable key of a stage, used for ordering and lookup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum StageKey {
    Files,
    Details,
    Loaders,
    #[serde(alias = "mc-versions")]
    Targets,
    Environment,
    Dependencies,
    Changelog,
}

impl StageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKey::Files => "files",
            StageKey::Details => "details",
            StageKey::Loaders => "loaders",
            StageKey::Targets => "targets",
            StageKey::Environment => "environment",
            StageKey::Dependencies => "dependencies",
            StageKey::Changelog => "changelog",
        }
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKey {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "files" => Ok(StageKey::Files),
            "details" => Ok(StageKey::Details),
            "loaders" => Ok(StageKey::Loaders),
            "targets" | "mc-versions" => Ok(StageKey::Targets),
            "environment" => Ok(StageKey::Environment),
            "dependencies" => Ok(StageKey::Dependencies),
            "changelog" => Ok(StageKey::Changelog),
            other => Err(PipelineError::UnknownStage {
                key: other.to_string(),
            }),
        }
    }
}

/// Validated-on-submit input for one stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "stage", content = "input", rename_all = "kebab-case")]
pub enum StageInput {
    Files(Vec<VersionFile>),
    Details(VersionDetails),
    Loaders(BTreeSet<String>),
    #[serde(alias = "mc-versions")]
    Targets(BTreeSet<String>),
    Environment(Environment),
    Dependencies(Vec<Dependency>),
    Changelog(String),
}

impl StageInput {
    /// The stage this input belongs to
    pub fn key(&self) -> StageKey {
        match self {
            StageInput::Files(_) => StageKey::Files,
            StageInput::Details(_) => StageKey::Details,
            StageInput::Loaders(_) => StageKey::Loaders,
            StageInput::Targets(_) => StageKey::Targets,
            StageInput::Environment(_) => StageKey::Environment,
            StageInput::Dependencies(_) => StageKey::Dependencies,
            StageInput::Changelog(_) => StageKey::Changelog,
        }
    }

    pub fn loaders<I, S>(loaders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StageInput::Loaders(loaders.into_iter().map(Into::into).collect())
    }

    pub fn targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StageInput::Targets(targets.into_iter().map(Into::into).collect())
    }
}

/// Externally fetched data some stages validate against
///
/// Built by the caller for each submission; the pipeline never fetches it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageContext {
    loader_whitelist: Option<BTreeSet<String>>,
    target_whitelist: Option<BTreeSet<String>>,
}

impl StageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaders valid for the project's type
    pub fn with_loaders<I, S>(mut self, loaders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loader_whitelist = Some(loaders.into_iter().map(Into::into).collect());
        self
    }

    /// Targets valid for the project's type
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_whitelist = Some(targets.into_iter().map(Into::into).collect());
        self
    }

    pub fn loader_whitelist(&self) -> Option<&BTreeSet<String>> {
        self.loader_whitelist.as_ref()
    }

    pub fn target_whitelist(&self) -> Option<&BTreeSet<String>> {
        self.target_whitelist.as_ref()
    }
}

/// Checks an input and returns every violated constraint
pub type ValidateFn = fn(&StageInput, &StageContext) -> ValidationErrors;

/// Pure transform applied after successful validation
pub type CommitFn = fn(DraftVersion, StageInput) -> DraftVersion;

/// Declarative descriptor of one wizard step
#[derive(Debug, Clone, Copy)]
pub struct StageDefinition {
    pub key: StageKey,
    /// Position in the wizard sequence
    pub ordinal: usize,
    /// Must commit at least once before the draft is complete
    pub mandatory: bool,
    /// Stages that must precede this one in registry order
    pub prerequisites: &'static [StageKey],
    /// Whether a from-details variant exists
    pub from_details: bool,
    /// Explicit empty value for stages that may be skipped
    pub empty_input: Option<fn() -> StageInput>,
    pub validate: ValidateFn,
    pub commit: CommitFn,
}

impl StageDefinition {
    pub fn has_from_details_variant(&self) -> bool {
        self.from_details
    }

    pub fn is_skippable(&self) -> bool {
        self.empty_input.is_some()
    }

    /// Validate an input against this stage's contract
    pub fn check(&self, input: &StageInput, ctx: &StageContext) -> Result<()> {
        if input.key() != self.key {
            return ValidationErrors::single(
                "stage",
                format!("expected {} input, got {}", self.key, input.key()),
            )
            .into_result();
        }
        (self.validate)(input, ctx).into_result()
    }

    /// Apply the commit transform; callers validate first
    pub fn apply(&self, draft: DraftVersion, input: StageInput) -> DraftVersion {
        (self.commit)(draft, input)
    }
}
