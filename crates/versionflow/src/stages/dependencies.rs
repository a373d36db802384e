//! Dependencies stage: references to other projects or versions

use std::collections::HashSet;

use crate::draft::DraftVersion;
use crate::error::ValidationErrors;
use crate::stage::{StageContext, StageDefinition, StageInput, StageKey};

pub const DEFINITION: StageDefinition = StageDefinition {
    key: StageKey::Dependencies,
    ordinal: 5,
    mandatory: true,
    prerequisites: &[],
    from_details: false,
    empty_input: Some(|| StageInput::Dependencies(Vec::new())),
    validate,
    commit,
};

fn validate(input: &StageInput, _ctx: &StageContext) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let StageInput::Dependencies(dependencies) = input else {
        return errors;
    };

    let mut seen = HashSet::new();
    for (i, dependency) in dependencies.iter().enumerate() {
        if dependency.target.id().trim().is_empty() {
            errors.push(format!("dependencies[{i}].target"), "reference id must not be empty");
        } else if !seen.insert(&dependency.target) {
            errors.push(
                format!("dependencies[{i}].target"),
                format!("'{}' is already listed", dependency.target.id()),
            );
        }
    }

    errors
}

fn commit(mut draft: DraftVersion, input: StageInput) -> DraftVersion {
    if let StageInput::Dependencies(dependencies) = input {
        draft.dependencies = dependencies;
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{Dependency, DependencyKind};

    fn check(dependencies: Vec<Dependency>) -> ValidationErrors {
        validate(&StageInput::Dependencies(dependencies), &StageContext::new())
    }

    #[test]
    fn test_empty_is_allowed() {
        assert!(check(vec![]).is_empty());
    }

    #[test]
    fn test_duplicates_and_blank_ids() {
        let errors = check(vec![
            Dependency::project("P7dR8mSH", DependencyKind::Required),
            Dependency::project("P7dR8mSH", DependencyKind::Optional),
            Dependency::version(" ", DependencyKind::Embedded),
        ]);
        assert!(errors.names_field("dependencies[1].target"));
        assert!(errors.names_field("dependencies[2].target"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_same_id_as_project_and_version_is_distinct() {
        let errors = check(vec![
            Dependency::project("abc", DependencyKind::Required),
            Dependency::version("abc", DependencyKind::Incompatible),
        ]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_commit_keeps_order() {
        let deps = vec![
            Dependency::project("b", DependencyKind::Required),
            Dependency::project("a", DependencyKind::Optional),
        ];
        let draft = commit(DraftVersion::new(), StageInput::Dependencies(deps.clone()));
        assert_eq!(draft.dependencies(), deps.as_slice());
    }
}
