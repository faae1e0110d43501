//! Transient user-facing messages
//!
//! Every flow outcome becomes a [`Notice`]; the presentation layer decides
//! how long to show it.

use std::fmt;

use tracing::error;

use crate::error::SettingsError;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NoticeKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title, message)
    }

    /// Message for a failure nobody anticipated. Internals stay hidden.
    pub fn unexpected() -> Self {
        Self::new(
            NoticeKind::Error,
            "System error",
            "Something went wrong. Please refresh the page.",
        )
    }

    /// Top-level handler for a failure no flow reported. The full chain goes
    /// to the log; the user sees [`Notice::unexpected`].
    pub fn unhandled(err: &anyhow::Error) -> Self {
        error!("Unhandled error: {:#}", err);
        Self::unexpected()
    }

    /// Notice for a failed flow. `action` names what was being done, e.g.
    /// "save audio settings".
    pub fn from_error(err: &SettingsError, action: &str) -> Self {
        match err {
            SettingsError::Validation(v) => Self::from_validation(v),
            SettingsError::NotAuthenticated => Self::new(
                NoticeKind::Warning,
                "Authentication failed",
                format!("Please sign in again to {}", action),
            ),
            SettingsError::NoProfile => {
                Self::new(NoticeKind::Error, "No data", "User data was not found")
            }
            SettingsError::InvalidCredential => Self::new(
                NoticeKind::Error,
                "Authentication failed",
                "Current password is incorrect",
            ),
            SettingsError::SessionExpired => Self::new(
                NoticeKind::Warning,
                "Session expired",
                "Please sign in again to continue",
            ),
            SettingsError::Remote(_) => Self::new(
                NoticeKind::Error,
                "Something went wrong",
                format!("Could not {}. Please try again.", action),
            ),
        }
    }

    fn from_validation(err: &ValidationError) -> Self {
        let (kind, title) = match err {
            ValidationError::NameRequired | ValidationError::AgeRequired => {
                (NoticeKind::Warning, "Incomplete data")
            }
            ValidationError::AgeNotNumeric => (NoticeKind::Error, "Invalid input"),
            ValidationError::AgeTooYoung | ValidationError::AgeTooOld => {
                (NoticeKind::Error, "Age check")
            }
            ValidationError::PasswordFieldsMissing => (NoticeKind::Warning, "Incomplete data"),
            ValidationError::PasswordMismatch | ValidationError::PasswordTooShort => {
                (NoticeKind::Warning, "Password check")
            }
        };
        Self::new(kind, title, err.to_string())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind.icon(), self.title, self.message)
    }
}
