//! Error types for snippet storage

use thiserror::Error;

use crate::snippet::SnippetId;

/// Errors raised by the persistence layer
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by snippet store operations
#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Snippet not found: {id}")]
    NotFound { id: SnippetId },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

impl SnippetError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that rejected the input without touching state
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, SnippetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = SnippetError::validation("title", "must not be empty");
        assert_eq!(err.to_string(), "Invalid title: must not be empty");
        assert!(err.is_validation());
    }

    #[test]
    fn test_not_found_message() {
        let err = SnippetError::NotFound { id: 42 };
        assert!(err.to_string().contains("42"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_persistence_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: SnippetError = PersistenceError::from(io).into();
        assert!(matches!(err, SnippetError::Persistence(PersistenceError::Io(_))));
        assert!(err.to_string().contains("read-only"));
    }
}
