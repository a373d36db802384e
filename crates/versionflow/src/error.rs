//! Error types for the versionflow pipeline
//!
//! Validation failures are local and recoverable: the draft and the cursor are
//! left exactly as they were. Unknown stage keys and illegal mode transitions
//! are caller errors and close the session.

use std::fmt;
use thiserror::Error;

use crate::stage::StageKey;

/// Main error type for pipeline operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// One or more fields of a stage input were rejected
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Single-stage edit was requested for a wizard-only stage
    #[error("Stage '{stage}' can only be edited through the full wizard")]
    StageNotEditableStandalone { stage: StageKey },

    /// The requested mode cannot be entered from the current state
    #[error("Invalid mode transition: {reason}")]
    InvalidModeTransition { reason: String },

    /// The stage key is not part of the registry
    #[error("Unknown stage: {key}")]
    UnknownStage { key: String },

    /// Wizard entry attempted before the preceding mandatory stages committed
    #[error("Stage '{stage}' is locked until {} committed", format_keys(.missing))]
    StageLocked {
        stage: StageKey,
        missing: Vec<StageKey>,
    },

    /// back() was called with nothing committed
    #[error("No committed stage to go back to")]
    NoHistory,

    /// The session has finished or was aborted by a fatal error
    #[error("Pipeline session is closed")]
    SessionClosed,

    /// Registry construction rejected the stage definitions
    #[error("Invalid stage registry: {reason}")]
    InvalidRegistry { reason: String },
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldViolation {
    /// Dotted path of the field, e.g. `details.name` or `files[0].hashes`
    pub field: String,
    /// Human-readable reason
    pub reason: String,
}

/// Every constraint a stage input violated, in the order they were checked
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation
    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            reason: reason.into(),
        });
    }

    /// Shorthand for a single-violation error set
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, reason);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether any violation names exactly this field
    pub fn names_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// Append all violations of another set
    pub fn extend(&mut self, other: ValidationErrors) {
        self.violations.extend(other.violations);
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.reason)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldViolation;
    type IntoIter = std::slice::Iter<'a, FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

fn format_keys(keys: &[StageKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shorthand result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Whether the session may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::Validation(_)
                | PipelineError::StageNotEditableStandalone { .. }
                | PipelineError::StageLocked { .. }
                | PipelineError::NoHistory
        )
    }

    /// Errors that abort the pipeline session
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidModeTransition { .. } | PipelineError::UnknownStage { .. }
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation(errors) => match errors.violations() {
                [only] => format!("Please fix {}: {}", only.field, only.reason),
                many => format!("Please fix {} problems before continuing", many.len()),
            },
            PipelineError::StageNotEditableStandalone { stage } => {
                format!("'{}' can only be changed by creating a new version", stage)
            }
            PipelineError::InvalidModeTransition { .. } => {
                "This version cannot be edited this way. Start the version wizard again."
                    .to_string()
            }
            PipelineError::StageLocked { missing, .. } => {
                format!("Complete {} first", format_keys(missing))
            }
            PipelineError::NoHistory => "There is no previous step".to_string(),
            PipelineError::SessionClosed => {
                "This editing session has ended. Reopen the version to continue.".to_string()
            }
            PipelineError::UnknownStage { .. } | PipelineError::InvalidRegistry { .. } => {
                "Something went wrong while editing this version".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display_lists_every_field() {
        let mut errors = ValidationErrors::new();
        errors.push("details.name", "must not be empty");
        errors.push("details.version_number", "must not be empty");

        assert_eq!(
            errors.to_string(),
            "details.name: must not be empty; details.version_number: must not be empty"
        );
        assert_eq!(errors.len(), 2);
        assert!(errors.names_field("details.name"));
        assert!(!errors.names_field("details"));
    }

    #[test]
    fn test_empty_errors_into_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let err = ValidationErrors::single("loaders", "empty").into_result();
        assert!(matches!(err, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_classification() {
        let locked = PipelineError::StageLocked {
            stage: StageKey::Environment,
            missing: vec![StageKey::Files, StageKey::Details],
        };
        assert!(locked.is_recoverable());
        assert!(!locked.is_fatal());
        assert_eq!(
            locked.to_string(),
            "Stage 'environment' is locked until files, details committed"
        );

        let unknown = PipelineError::UnknownStage { key: "x".into() };
        assert!(unknown.is_fatal());
        assert!(!unknown.is_recoverable());
        assert!(PipelineError::InvalidModeTransition { reason: "r".into() }.is_fatal());
        assert!(!PipelineError::SessionClosed.is_recoverable());
    }
}
