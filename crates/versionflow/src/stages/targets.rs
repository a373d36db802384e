//! Supported targets stage: game versions the version runs on

use crate::draft::DraftVersion;
use crate::error::ValidationErrors;
use crate::stage::{StageContext, StageDefinition, StageInput, StageKey};

pub const DEFINITION: StageDefinition = StageDefinition {
    key: StageKey::Targets,
    ordinal: 3,
    mandatory: true,
    prerequisites: &[StageKey::Details],
    from_details: true,
    empty_input: None,
    validate,
    commit,
};

fn validate(input: &StageInput, ctx: &StageContext) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let StageInput::Targets(targets) = input else {
        return errors;
    };

    if targets.is_empty() {
        errors.push("targets", "select at least one supported version");
    }
    for target in targets {
        if target.trim().is_empty() {
            errors.push("targets", "target identifiers must not be blank");
        } else if let Some(whitelist) = ctx.target_whitelist() {
            if !whitelist.contains(target) {
                errors.push("targets", format!("'{target}' is not a known version"));
            }
        }
    }

    errors
}

fn commit(mut draft: DraftVersion, input: StageInput) -> DraftVersion {
    if let StageInput::Targets(targets) = input {
        draft.targets = targets;
    }
    draft
}
