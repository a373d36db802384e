//! Selects the wizard or from-details variant of a stage

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::registry::StageRegistry;
use crate::stage::{StageDefinition, StageKey};

/// How a pipeline session walks the registry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Full, ordered creation flow
    Wizard,
    /// One stage of an already published version
    SingleStageEdit,
}

/// Which configuration of a stage was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Wizard,
    FromDetails,
}

/// A stage definition paired with the entry rules of its variant
///
/// Both variants share validation and commit; only the entry precondition
/// differs.
#[derive(Debug, Clone, Copy)]
pub struct StageVariant<'r> {
    pub definition: &'r StageDefinition,
    pub kind: VariantKind,
}

impl StageVariant<'_> {
    pub fn key(&self) -> StageKey {
        self.definition.key
    }

    /// Whether preceding mandatory stages must have committed before entry
    pub fn requires_upstream(&self) -> bool {
        self.kind == VariantKind::Wizard
    }
}

/// Pick the variant of `key` for `mode`
pub fn resolve(registry: &StageRegistry, key: StageKey, mode: Mode) -> Result<StageVariant<'_>> {
    let definition = registry.lookup(key)?;
    match mode {
        Mode::Wizard => Ok(StageVariant {
            definition,
            kind: VariantKind::Wizard,
        }),
        Mode::SingleStageEdit if definition.has_from_details_variant() => Ok(StageVariant {
            definition,
            kind: VariantKind::FromDetails,
        }),
        Mode::SingleStageEdit => Err(PipelineError::StageNotEditableStandalone { stage: key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wizard_resolves_every_stage() {
        let registry = StageRegistry::global();
        for key in registry.ordered_stages() {
            let variant = resolve(registry, key, Mode::Wizard).unwrap();
            assert_eq!(variant.kind, VariantKind::Wizard);
            assert!(variant.requires_upstream());
        }
    }

    #[test]
    fn test_single_stage_edit() {
        let registry = StageRegistry::global();
        for key in [StageKey::Loaders, StageKey::Targets, StageKey::Environment] {
            let variant = resolve(registry, key, Mode::SingleStageEdit).unwrap();
            assert_eq!(variant.kind, VariantKind::FromDetails);
            assert!(!variant.requires_upstream());
        }
        for key in [
            StageKey::Files,
            StageKey::Details,
            StageKey::Dependencies,
            StageKey::Changelog,
        ] {
            assert!(matches!(
                resolve(registry, key, Mode::SingleStageEdit),
                Err(PipelineError::StageNotEditableStandalone { stage }) if stage == key
            ));
        }
    }
}
