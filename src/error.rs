//! Error types shared across the crate.
//!
//! Field validation problems are carried as [`FieldErrors`], a map from dotted
//! field path (`location.full`, `photos.0.url`) to a human-readable message.
//! The remaining enums cover the transport, storage, form-path and favorites
//! failure modes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Fallback notification text when the server gives no usable message.
pub const GENERIC_FAILURE: &str = "Failed to add property";

/// Validation errors keyed by dotted field path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error map holding a single entry
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(path, message);
        errors
    }

    /// Record a message for `path`. The first message recorded for a path wins.
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(path, message)| (path.as_str(), message.as_str()))
    }

    /// Drop the entry for `path` and every entry nested below it
    pub fn remove_prefix(&mut self, path: &str) {
        let nested = format!("{path}.");
        self.0.retain(|key, _| key != path && !key.starts_with(&nested));
    }

    /// One-line description: the first error plus a count of the rest
    pub fn summary(&self) -> String {
        match self.0.iter().next() {
            None => "no validation errors".to_string(),
            Some((path, message)) if self.0.len() == 1 => format!("{path}: {message}"),
            Some((path, message)) => {
                format!("{path}: {message} (and {} more)", self.0.len() - 1)
            }
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (path, message)) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{path}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Failures talking to the listing endpoint
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("request rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },

    /// A success response whose body could not be decoded
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text suitable for a user-visible notification
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Transport(err) => err.to_string(),
            ApiError::Rejected { .. } | ApiError::Decode(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Failures at the listing collection boundary
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("slug already exists")]
    DuplicateSlug(String),

    #[error("slug cannot be changed after creation")]
    SlugImmutable,

    #[error("listing not found: {0}")]
    NotFound(String),

    #[error("{}", .0.summary())]
    Invalid(FieldErrors),
}

/// Invalid addressing of the form state
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("invalid field path: `{0}`")]
    InvalidPath(String),

    #[error("index {index} out of bounds for `{path}` (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Failures reading or writing the local favorites set
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("failed to access favorites: {0}")]
    Io(#[from] std::io::Error),

    #[error("favorites data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_path_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("price", "Price must be positive");
        errors.insert("price", "Required");
        assert_eq!(errors.get("price"), Some("Price must be positive"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_remove_prefix_drops_nested_paths_only() {
        let mut errors = FieldErrors::new();
        errors.insert("photos", "At least one photo is required");
        errors.insert("photos.0.url", "Must be a valid URL");
        errors.insert("photosCount", "unrelated");
        errors.remove_prefix("photos");
        assert!(!errors.contains("photos"));
        assert!(!errors.contains("photos.0.url"));
        assert!(errors.contains("photosCount"));
    }

    #[test]
    fn test_summary() {
        let mut errors = FieldErrors::single("title", "Title must be at least 5 characters");
        assert_eq!(errors.summary(), "title: Title must be at least 5 characters");
        errors.insert("area", "Area must be positive");
        assert_eq!(errors.summary(), "area: Area must be positive (and 1 more)");
    }

    #[test]
    fn test_rejected_message_fallback() {
        let with_message = ApiError::Rejected {
            status: 400,
            message: Some("slug already exists".to_string()),
        };
        assert_eq!(with_message.user_message(), "slug already exists");

        let without_message = ApiError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(without_message.user_message(), GENERIC_FAILURE);

        let blank = ApiError::Rejected {
            status: 400,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_field_errors_serialize_as_plain_map() {
        let errors = FieldErrors::single("location.full", "Full address is required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["location.full"], "Full address is required");
    }
}
