//! Files stage: the ordered set of uploaded artifacts

use std::collections::HashSet;

use crate::draft::DraftVersion;
use crate::error::ValidationErrors;
use crate::stage::{StageContext, StageDefinition, StageInput, StageKey};

pub const DEFINITION: StageDefinition = StageDefinition {
    key: StageKey::Files,
    ordinal: 0,
    mandatory: true,
    prerequisites: &[],
    from_details: false,
    empty_input: None,
    validate,
    commit,
};

fn validate(input: &StageInput, _ctx: &StageContext) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let StageInput::Files(files) = input else {
        return errors;
    };

    if files.is_empty() {
        errors.push("files", "at least one file is required");
        return errors;
    }

    let mut seen = HashSet::new();
    for (i, file) in files.iter().enumerate() {
        let filename = file.filename.trim();
        if filename.is_empty() {
            errors.push(format!("files[{i}].filename"), "must not be empty");
        } else if !seen.insert(filename) {
            errors.push(
                format!("files[{i}].filename"),
                format!("duplicate file name '{filename}'"),
            );
        }
        if file.size == 0 {
            errors.push(format!("files[{i}].size"), "file is empty");
        }
        if !file.hashes.has_any() {
            errors.push(format!("files[{i}].hashes"), "at least one content hash is required");
        }
    }

    if files.iter().filter(|f| f.primary).count() > 1 {
        errors.push("files", "only one file can be primary");
    }

    errors
}

fn commit(mut draft: DraftVersion, input: StageInput) -> DraftVersion {
    if let StageInput::Files(files) = input {
        draft.files = files;
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{FileHashes, VersionFile};

    fn check(files: Vec<VersionFile>) -> ValidationErrors {
        validate(&StageInput::Files(files), &StageContext::new())
    }

    #[test]
    fn test_valid_files() {
        let errors = check(vec![
            VersionFile::new("mod.jar", 1024, "abc").primary(),
            VersionFile::new("mod-sources.jar", 512, "def"),
        ]);
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn test_empty_set_rejected() {
        let errors = check(vec![]);
        assert!(errors.names_field("files"));
    }

    #[test]
    fn test_every_broken_file_is_reported() {
        let mut no_hash = VersionFile::new("b.jar", 10, "x");
        no_hash.hashes = FileHashes::default();
        let errors = check(vec![
            VersionFile::new("", 0, "abc"),
            no_hash,
            VersionFile::new("b.jar", 10, "y"),
        ]);

        assert!(errors.names_field("files[0].filename"));
        assert!(errors.names_field("files[0].size"));
        assert!(errors.names_field("files[1].hashes"));
        assert!(errors.names_field("files[2].filename"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_two_primaries_rejected() {
        let errors = check(vec![
            VersionFile::new("a.jar", 1, "a").primary(),
            VersionFile::new("b.jar", 1, "b").primary(),
        ]);
        assert!(errors.names_field("files"));
    }

    #[test]
    fn test_commit_replaces_file_set() {
        let draft = commit(
            DraftVersion::new(),
            StageInput::Files(vec![VersionFile::new("a.jar", 1, "a")]),
        );
        let draft = commit(
            draft,
            StageInput::Files(vec![VersionFile::new("b.jar", 2, "b")]),
        );
        assert_eq!(draft.files().len(), 1);
        assert_eq!(draft.files()[0].filename, "b.jar");
    }
}
