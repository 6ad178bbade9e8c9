use crate::error::FieldErrors;
use crate::models::Purpose;
use serde::{Deserialize, Serialize};

/// Filters for the listing index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Only listings with this purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<Purpose>,
    /// Include listings whose `show` flag is off
    #[serde(default, rename = "all")]
    pub include_hidden: bool,
}

impl ListingQuery {
    pub fn purpose(purpose: Purpose) -> Self {
        Self {
            purpose: Some(purpose),
            ..Self::default()
        }
    }
}

/// Error document returned by the listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}
