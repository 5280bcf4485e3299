//! Error types for the editor

use pagebuilder_model::PathError;
use thiserror::Error;

/// Failure reported by a backend collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced to editor callers
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Page not found: {slug}")]
    NotFound { slug: String },

    /// A page or section id the backend no longer knows
    #[error("Not found: {0}")]
    Missing(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No page is open")]
    NoDocument,

    #[error("Page has no version {0}")]
    UnknownVersion(u32),

    #[error("Invalid content path: {0}")]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EditorError {
    /// Session-ending errors; the caller should navigate away
    pub fn is_fatal(&self) -> bool {
        matches!(self, EditorError::NotFound { .. })
    }

    /// Errors worth a transient notification and a later retry
    pub fn is_transient(&self) -> bool {
        matches!(self, EditorError::Network(_) | EditorError::Timeout)
    }
}

impl From<BackendError> for EditorError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound(what) => EditorError::Missing(what),
            BackendError::Network(message) => EditorError::Network(message),
            BackendError::Timeout => EditorError::Timeout,
            BackendError::Validation(message) => EditorError::Validation(message),
            BackendError::Conflict(message) => EditorError::Conflict(message),
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_map_onto_taxonomy() {
        let err = EditorError::NotFound {
            slug: "home".into(),
        };
        assert!(err.is_fatal());

        let err: EditorError = BackendError::NotFound("section s-1".into()).into();
        assert!(matches!(err, EditorError::Missing(ref what) if what == "section s-1"));
        assert!(!err.is_fatal());

        let err: EditorError = BackendError::Timeout.into();
        assert!(err.is_transient());
        assert!(!err.is_fatal());

        let err: EditorError = BackendError::Validation("bad".into()).into();
        assert!(!err.is_transient());
    }
}
