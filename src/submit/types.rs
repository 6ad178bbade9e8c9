use crate::error::FieldErrors;
use crate::models::Listing;

/// Route of the listing index the workflow redirects to
pub const LISTINGS_ROUTE: &str = "/properties";

pub const SUCCESS_MESSAGE: &str = "Property has been added successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            text: text.into(),
        }
    }
}

/// Where the submission workflow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Redirected,
}

/// Result of one submit trigger
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another submission was in flight; nothing happened
    Ignored,
    /// Validation failed; no request was made
    Invalid(FieldErrors),
    /// The request failed; the text is what the user was shown
    Failed(String),
    /// The listing was stored
    Created(Listing),
}
