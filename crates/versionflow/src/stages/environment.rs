//! Environment stage: client/server compatibility

use crate::draft::DraftVersion;
use crate::error::ValidationErrors;
use crate::stage::{StageContext, StageDefinition, StageInput, StageKey};

pub const DEFINITION: StageDefinition = StageDefinition {
    key: StageKey::Environment,
    ordinal: 4,
    mandatory: true,
    prerequisites: &[],
    from_details: true,
    empty_input: None,
    validate,
    commit,
};

// Every variant of `Environment` is a valid choice.
fn validate(_input: &StageInput, _ctx: &StageContext) -> ValidationErrors {
    ValidationErrors::new()
}

fn commit(mut draft: DraftVersion, input: StageInput) -> DraftVersion {
    if let StageInput::Environment(environment) = input {
        draft.environment = Some(environment);
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Environment;

    #[test]
    fn test_commit_sets_environment() {
        let draft = commit(
            DraftVersion::new(),
            StageInput::Environment(Environment::ClientOnly),
        );
        assert_eq!(draft.environment(), Some(Environment::ClientOnly));
    }
}
