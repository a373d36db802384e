//! Changelog stage: free text, may be empty

use crate::draft::DraftVersion;
use crate::error::ValidationErrors;
use crate::stage::{StageContext, StageDefinition, StageInput, StageKey};

pub const MAX_CHANGELOG_LEN: usize = 65536;

pub const DEFINITION: StageDefinition = StageDefinition {
    key: StageKey::Changelog,
    ordinal: 6,
    mandatory: true,
    prerequisites: &[],
    from_details: false,
    empty_input: Some(|| StageInput::Changelog(String::new())),
    validate,
    commit,
};

fn validate(input: &StageInput, _ctx: &StageContext) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if let StageInput::Changelog(text) = input {
        if text.chars().count() > MAX_CHANGELOG_LEN {
            errors.push(
                "changelog",
                format!("must be at most {MAX_CHANGELOG_LEN} characters"),
            );
        }
    }
    errors
}

fn commit(mut draft: DraftVersion, input: StageInput) -> DraftVersion {
    if let StageInput::Changelog(text) = input {
        draft.changelog = text;
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_long_changelogs() {
        let ctx = StageContext::new();
        assert!(validate(&StageInput::Changelog(String::new()), &ctx).is_empty());
        assert!(validate(&StageInput::Changelog("x".repeat(MAX_CHANGELOG_LEN)), &ctx).is_empty());

        let errors = validate(&StageInput::Changelog("x".repeat(MAX_CHANGELOG_LEN + 1)), &ctx);
        assert!(errors.names_field("changelog"));
    }
}
