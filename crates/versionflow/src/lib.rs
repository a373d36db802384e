//! Versionflow walks a draft project version through an ordered set of
//! publishing stages: files, details, loaders, supported targets,
//! environment, dependencies and changelog.
//!
//! Sessions run either as a full wizard or as a single-stage edit of an
//! already published version. Stage commits are pure; persistence, network
//! lookups and notifications belong to the caller.
//!
//! ```rust
//! use versionflow::*;
//!
//! let registry = StageRegistry::global();
//! let mut session = PipelineSession::start(registry, StartMode::Wizard, None)?;
//! let ctx = StageContext::new().with_loaders(["fabric"]);
//!
//! session.submit_stage(
//!     StageInput::Files(vec![VersionFile::new("mod.jar", 1024, "abc")]),
//!     &ctx,
//! )?;
//! assert_eq!(session.current_stage(), Some(StageKey::Details));
//! # Ok::<(), PipelineError>(())
//! ```

pub mod draft;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod stage;
pub mod stages;

pub use draft::{
    Dependency, DependencyKind, DependencyTarget, DraftVersion, Environment, FileHashes,
    ReleaseChannel, VersionDetails, VersionFile, VersionId,
};
pub use error::{FieldViolation, PipelineError, Result, ValidationErrors};
pub use orchestrator::{PipelinePosition, PipelineSession, StartMode};
pub use registry::StageRegistry;
pub use resolver::{Mode, StageVariant, VariantKind, resolve};
pub use stage::{StageContext, StageDefinition, StageInput, StageKey};

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
