//! The ordered catalog of stage definitions
//!
//! Order encodes a dependency chain (loaders and targets read a whitelist
//! derived from details), so a registry is immutable once built.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::error::{PipelineError, Result};
use crate::stage::{StageDefinition, StageKey};
use crate::stages;

static BUILTIN: Lazy<StageRegistry> = Lazy::new(|| {
    StageRegistry::from_definitions(stages::builtin())
        .expect("built-in stage definitions are ordered")
});

/// Immutable, ordered stage catalog
#[derive(Debug)]
pub struct StageRegistry {
    stages: Vec<StageDefinition>,
}

impl StageRegistry {
    /// The process-wide registry of built-in stages
    pub fn global() -> &'static StageRegistry {
        &BUILTIN
    }

    /// Build a registry, checking keys, ordinals and prerequisite order
    pub fn from_definitions(stages: Vec<StageDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (position, stage) in stages.iter().enumerate() {
            if stage.ordinal != position {
                return Err(PipelineError::InvalidRegistry {
                    reason: format!(
                        "stage '{}' declares ordinal {} but sits at position {}",
                        stage.key, stage.ordinal, position
                    ),
                });
            }
            for prerequisite in stage.prerequisites {
                if !seen.contains(prerequisite) {
                    return Err(PipelineError::InvalidRegistry {
                        reason: format!(
                            "stage '{}' must follow '{}'",
                            stage.key, prerequisite
                        ),
                    });
                }
            }
            if !seen.insert(stage.key) {
                return Err(PipelineError::InvalidRegistry {
                    reason: format!("stage '{}' is registered twice", stage.key),
                });
            }
        }
        Ok(Self { stages })
    }

    /// Stage keys in wizard order
    pub fn ordered_stages(&self) -> Vec<StageKey> {
        self.stages.iter().map(|s| s.key).collect()
    }

    pub fn definitions(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn lookup(&self, key: StageKey) -> Result<&StageDefinition> {
        self.stages
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| PipelineError::UnknownStage {
                key: key.to_string(),
            })
    }

    /// Look up a stage by its string key
    pub fn lookup_str(&self, key: &str) -> Result<&StageDefinition> {
        self.lookup(key.parse()?)
    }

    /// Stage following `key` in registry order
    pub fn next_after(&self, key: StageKey) -> Result<Option<StageKey>> {
        let def = self.lookup(key)?;
        Ok(self.stages.get(def.ordinal + 1).map(|s| s.key))
    }

    /// Mandatory stages strictly before `key`
    pub fn mandatory_before(&self, key: StageKey) -> Result<Vec<StageKey>> {
        let def = self.lookup(key)?;
        Ok(self.stages[..def.ordinal]
            .iter()
            .filter(|s| s.mandatory)
            .map(|s| s.key)
            .collect())
    }

    pub fn mandatory_stages(&self) -> Vec<StageKey> {
        self.stages
            .iter()
            .filter(|s| s.mandatory)
            .map(|s| s.key)
            .collect()
    }

    pub fn first(&self) -> Option<StageKey> {
        self.stages.first().map(|s| s.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{details, files, loaders};

    #[test]
    fn test_builtin_order() {
        let registry = StageRegistry::global();
        assert_eq!(
            registry.ordered_stages(),
            vec![
                StageKey::Files,
                StageKey::Details,
                StageKey::Loaders,
                StageKey::Targets,
                StageKey::Environment,
                StageKey::Dependencies,
                StageKey::Changelog,
            ]
        );
        assert_eq!(registry.mandatory_stages().len(), 7);
    }

    #[test]
    fn test_loaders_and_targets_follow_details() {
        let registry = StageRegistry::global();
        let details = registry.lookup(StageKey::Details).unwrap().ordinal;
        for key in [StageKey::Loaders, StageKey::Targets] {
            let def = registry.lookup(key).unwrap();
            assert!(def.prerequisites.contains(&StageKey::Details));
            assert!(def.ordinal > details);
        }
    }

    #[test]
    fn test_from_details_variants() {
        let registry = StageRegistry::global();
        let editable: Vec<_> = registry
            .definitions()
            .iter()
            .filter(|d| d.has_from_details_variant())
            .map(|d| d.key)
            .collect();
        assert_eq!(
            editable,
            vec![StageKey::Loaders, StageKey::Targets, StageKey::Environment]
        );
    }

    #[test]
    fn test_lookup_unknown_string() {
        let registry = StageRegistry::global();
        assert!(matches!(
            registry.lookup_str("screenshots"),
            Err(PipelineError::UnknownStage { .. })
        ));
        assert_eq!(registry.lookup_str("changelog").unwrap().key, StageKey::Changelog);
    }

    #[test]
    fn test_lookup_missing_from_custom_registry() {
        let mut only_files = files::DEFINITION;
        only_files.ordinal = 0;
        let registry = StageRegistry::from_definitions(vec![only_files]).unwrap();
        assert!(matches!(
            registry.lookup(StageKey::Changelog),
            Err(PipelineError::UnknownStage { key }) if key == "changelog"
        ));
    }

    #[test]
    fn test_prerequisite_order_enforced() {
        let mut loaders = loaders::DEFINITION;
        loaders.ordinal = 0;
        let mut details = details::DEFINITION;
        details.ordinal = 1;
        let err = StageRegistry::from_definitions(vec![loaders, details]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRegistry { .. }));
    }

    #[test]
    fn test_duplicates_and_ordinals_rejected() {
        let mut second = files::DEFINITION;
        second.ordinal = 1;
        assert!(StageRegistry::from_definitions(vec![files::DEFINITION, second]).is_err());

        assert!(StageRegistry::from_definitions(vec![details::DEFINITION]).is_err());
    }

    #[test]
    fn test_navigation_helpers() {
        let registry = StageRegistry::global();
        assert_eq!(
            registry.next_after(StageKey::Details).unwrap(),
            Some(StageKey::Loaders)
        );
        assert_eq!(registry.next_after(StageKey::Changelog).unwrap(), None);
        assert_eq!(
            registry.mandatory_before(StageKey::Loaders).unwrap(),
            vec![StageKey::Files, StageKey::Details]
        );
    }
}
