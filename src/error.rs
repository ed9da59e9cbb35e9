//! Custom error types for paper-trail
//!
//! This module defines the error hierarchy for the library using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for audit-trail operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// No primary key could be resolved for an entity type
    #[error("key not found for {type_full_name}")]
    KeyNotFound { type_full_name: String },

    /// Original values were required but unavailable
    #[error("original values unavailable for {type_full_name}")]
    MissingOriginals { type_full_name: String },

    /// The save was cancelled before any work was committed
    #[error("save cancelled")]
    Cancelled,

    /// Persistence errors surfaced by the backing store
    #[error("Store error: {0}")]
    Store(String),
}

impl AuditError {
    /// Create a "key not found" error for an entity type
    pub fn key_not_found(type_full_name: impl Into<String>) -> Self {
        Self::KeyNotFound {
            type_full_name: type_full_name.into(),
        }
    }

    /// Create a "missing originals" error for an entity type
    pub fn missing_originals(type_full_name: impl Into<String>) -> Self {
        Self::MissingOriginals {
            type_full_name: type_full_name.into(),
        }
    }

    /// Create a store error from any displayable failure
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(err.to_string())
    }

    /// Check if this is a "key not found" error
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for audit-trail operations
pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuditError::Store("test error".into());
        assert_eq!(err.to_string(), "Store error: test error");
    }

    #[test]
    fn test_key_not_found_error() {
        let err = AuditError::key_not_found("billing.Invoice");
        assert_eq!(err.to_string(), "key not found for billing.Invoice");
        assert!(err.is_key_not_found());
    }

    #[test]
    fn test_cancelled_error() {
        let err = AuditError::Cancelled;
        assert_eq!(err.to_string(), "save cancelled");
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let audit_err: AuditError = io_err.into();
        assert!(matches!(audit_err, AuditError::Io(_)));
    }
}
