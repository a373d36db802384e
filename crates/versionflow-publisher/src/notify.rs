//! User-facing notifications
//!
//! The pipeline never renders anything; errors are turned into
//! [`Notification`]s and handed to a [`NotificationSink`].

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{error, info, warn};
use versionflow::PipelineError;

use crate::download::DownloadError;
use crate::error::PublisherError;

/// Default notification group
pub const MAIN_GROUP: &str = "main";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warn,
    Error,
}

/// A message to surface to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub group: String,
    pub title: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// An error response from the marketplace API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: Option<u16>,
    /// Machine-readable error code, e.g. `ratelimit_error`
    pub error: Option<String>,
    pub description: Option<String>,
}

impl Notification {
    pub fn new(
        group: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
            text: text.into(),
            kind,
        }
    }

    pub fn from_pipeline_error(group: &str, err: &PipelineError) -> Self {
        let (kind, title) = match err {
            PipelineError::Validation(_) => (NotificationKind::Error, "Please check your input"),
            PipelineError::StageNotEditableStandalone { .. }
            | PipelineError::StageLocked { .. }
            | PipelineError::NoHistory => (NotificationKind::Warn, "Not available"),
            _ => (NotificationKind::Error, "Editing failed"),
        };
        Self::new(group, kind, title, err.user_message())
    }

    pub fn from_download_error(group: &str, err: &DownloadError) -> Self {
        Self::new(group, NotificationKind::Error, "Download failed", err.to_string())
    }

    pub fn from_publisher_error(group: &str, err: &PublisherError) -> Self {
        match err {
            PublisherError::Pipeline(e) => Self::from_pipeline_error(group, e),
            PublisherError::Download(e) => Self::from_download_error(group, e),
            PublisherError::Incomplete(_) | PublisherError::EditNotFinished => {
                Self::new(group, NotificationKind::Warn, "Version not ready", err.to_string())
            }
            other => Self::new(
                group,
                NotificationKind::Error,
                "Something went wrong",
                other.to_string(),
            ),
        }
    }

    /// Notification for an API failure the user should hear about
    ///
    /// Rate limiting and account bans are surfaced; anything else is left to
    /// the caller's own error handling.
    pub fn from_api_failure(group: &str, failure: &ApiFailure) -> Option<Self> {
        let code = failure.error.as_deref();
        if failure.status == Some(429) || code == Some("ratelimit_error") {
            let description = failure
                .description
                .as_deref()
                .unwrap_or("You are sending requests too quickly");
            return Some(Self::new(
                group,
                NotificationKind::Warn,
                "Too many requests",
                format!("{description}, please try again later."),
            ));
        }
        if code == Some("user_banned") {
            let description = failure
                .description
                .as_deref()
                .unwrap_or("Your account has been banned");
            return Some(Self::new(
                group,
                NotificationKind::Error,
                "Action restricted",
                format!(
                    "{description}. See your account settings for details or to file an appeal."
                ),
            ));
        }
        None
    }
}

/// Receiver of user-facing notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.kind {
            NotificationKind::Info => info!(group = %n.group, title = %n.title, "{}", n.text),
            NotificationKind::Warn => warn!(group = %n.group, title = %n.title, "{}", n.text),
            NotificationKind::Error => error!(group = %n.group, title = %n.title, "{}", n.text),
        }
    }
}

/// Keeps every notification, for tests and batch tools
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use versionflow::{StageKey, ValidationErrors};

    #[test]
    fn test_rate_limit_by_status_or_code() {
        let by_status = ApiFailure {
            status: Some(429),
            ..Default::default()
        };
        let n = Notification::from_api_failure(MAIN_GROUP, &by_status).unwrap();
        assert_eq!(n.kind, NotificationKind::Warn);
        assert_eq!(n.title, "Too many requests");
        assert_eq!(
            n.text,
            "You are sending requests too quickly, please try again later."
        );

        let by_code = ApiFailure {
            status: Some(400),
            error: Some("ratelimit_error".into()),
            description: Some("Slow down".into()),
        };
        let n = Notification::from_api_failure(MAIN_GROUP, &by_code).unwrap();
        assert_eq!(n.text, "Slow down, please try again later.");
    }

    #[test]
    fn test_banned_user() {
        let failure = ApiFailure {
            status: Some(403),
            error: Some("user_banned".into()),
            description: None,
        };
        let n = Notification::from_api_failure("main", &failure).unwrap();
        assert_eq!(n.kind, NotificationKind::Error);
        assert!(n.text.starts_with("Your account has been banned."));
    }

    #[test]
    fn test_other_failures_are_not_surfaced() {
        let failure = ApiFailure {
            status: Some(500),
            error: Some("internal_error".into()),
            description: None,
        };
        assert!(Notification::from_api_failure(MAIN_GROUP, &failure).is_none());
    }

    #[test]
    fn test_pipeline_error_kinds() {
        let n = Notification::from_pipeline_error(
            MAIN_GROUP,
            &PipelineError::Validation(ValidationErrors::single("loaders", "empty")),
        );
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.text, "Please fix loaders: empty");

        let n = Notification::from_pipeline_error(
            MAIN_GROUP,
            &PipelineError::StageNotEditableStandalone {
                stage: StageKey::Files,
            },
        );
        assert_eq!(n.kind, NotificationKind::Warn);
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.notify(Notification::new(MAIN_GROUP, NotificationKind::Info, "t", "x"));
        assert_eq!(sink.notifications().len(), 1);
    }
}
