//! Loaders stage: mod loaders the version runs on
//!
//! The whitelist depends on the project type, so within the wizard this stage
//! follows `details`. From a published version's details view it can be
//! edited on its own.

use crate::draft::DraftVersion;
use crate::error::ValidationErrors;
use crate::stage::{StageContext, StageDefinition, StageInput, StageKey};

pub const DEFINITION: StageDefinition = StageDefinition {
    key: StageKey::Loaders,
    ordinal: 2,
    mandatory: true,
    prerequisites: &[StageKey::Details],
    from_details: true,
    empty_input: None,
    validate,
    commit,
};

fn validate(input: &StageInput, ctx: &StageContext) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let StageInput::Loaders(loaders) = input else {
        return errors;
    };

    if loaders.is_empty() {
        errors.push("loaders", "select at least one loader");
    }
    if loaders.iter().any(|l| l.trim().is_empty()) {
        errors.push("loaders", "loader identifiers must not be blank");
    }

    match ctx.loader_whitelist() {
        Some(whitelist) => {
            for loader in loaders.iter().filter(|l| !l.trim().is_empty()) {
                if !whitelist.contains(loader) {
                    errors.push(
                        "loaders",
                        format!("'{loader}' is not a valid loader for this project type"),
                    );
                }
            }
        }
        None => errors.push("loaders", "no loader whitelist was supplied"),
    }

    errors
}

fn commit(mut draft: DraftVersion, input: StageInput) -> DraftVersion {
    if let StageInput::Loaders(loaders) = input {
        draft.loaders = loaders;
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> StageContext {
        StageContext::new().with_loaders(["fabric", "forge", "quilt"])
    }

    #[test]
    fn test_whitelisted_loaders_pass() {
        let errors = validate(&StageInput::loaders(["fabric", "quilt"]), &ctx());
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn test_each_unknown_loader_reported() {
        let errors = validate(&StageInput::loaders(["fabric", "rift", "liteloader"]), &ctx());
        assert_eq!(errors.len(), 2);
        assert!(errors.violations().iter().all(|v| v.field == "loaders"));
    }

    #[test]
    fn test_empty_set_rejected() {
        let errors = validate(&StageInput::loaders(Vec::<String>::new()), &ctx());
        assert!(errors.names_field("loaders"));
    }

    #[test]
    fn test_missing_whitelist_rejected() {
        let errors = validate(&StageInput::loaders(["fabric"]), &StageContext::new());
        assert!(errors.names_field("loaders"));
    }
}
