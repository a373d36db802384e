//! Details stage: name, version number and release channel

use crate::draft::DraftVersion;
use crate::error::ValidationErrors;
use crate::stage::{StageContext, StageDefinition, StageInput, StageKey};

pub const MAX_NAME_LEN: usize = 64;
pub const MAX_NUMBER_LEN: usize = 32;

pub const DEFINITION: StageDefinition = StageDefinition {
    key: StageKey::Details,
    ordinal: 1,
    mandatory: true,
    prerequisites: &[],
    from_details: false,
    empty_input: None,
    validate,
    commit,
};

/// Characters allowed in a version number, which ends up in URLs
fn is_url_safe(c: char) -> bool {
    c.is_alphanumeric() || "!@$()`.+,_\"-".contains(c)
}

fn validate(input: &StageInput, _ctx: &StageContext) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let StageInput::Details(details) = input else {
        return errors;
    };

    let name_len = details.name.trim().chars().count();
    if name_len == 0 {
        errors.push("details.name", "must not be empty");
    } else if name_len > MAX_NAME_LEN {
        errors.push(
            "details.name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        );
    }

    let number = &details.version_number;
    let number_len = number.chars().count();
    if number_len == 0 {
        errors.push("details.number", "must not be empty");
    } else if number_len > MAX_NUMBER_LEN {
        errors.push(
            "details.number",
            format!("must be at most {MAX_NUMBER_LEN} characters"),
        );
    }
    if let Some(bad) = number.chars().find(|c| !is_url_safe(*c)) {
        errors.push(
            "details.number",
            format!("contains character '{bad}' that is not allowed in URLs"),
        );
    }

    errors
}

fn commit(mut draft: DraftVersion, input: StageInput) -> DraftVersion {
    if let StageInput::Details(details) = input {
        draft.details = details;
    }
    draft
}
