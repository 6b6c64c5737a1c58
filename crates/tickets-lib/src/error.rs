//! Error types for `tickets-lib`.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for ticket store operations.
#[derive(Error, Debug)]
pub enum TicketError {
    // === Ticket Errors ===
    /// Ticket with the specified ID was not found.
    #[error("Ticket not found: {id}")]
    TicketNotFound { id: String },

    /// Attempted to insert a ticket with an ID that already exists.
    #[error("Ticket ID collision: {id}")]
    IdCollision { id: String },

    /// Ticket ID format is invalid.
    #[error("Invalid ticket ID format: {id}")]
    InvalidId { id: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    // === JSONL Errors ===
    /// Failed to parse a line in the JSONL file.
    #[error("JSONL parse error at line {line}: {reason}")]
    JsonlParse { line: usize, reason: String },

    // === Storage Errors ===
    /// Generic storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl TicketError {
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }

    /// True for errors that mean "no such ticket" rather than a store fault.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TicketNotFound { .. } | Self::InvalidId { .. })
    }
}

/// Result type using `TicketError`.
pub type Result<T> = std::result::Result<T, TicketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_validation_error_collapses() {
        let err = TicketError::from_validation_errors(vec![ValidationError::new(
            "issue_title",
            "cannot be empty",
        )]);
        assert!(matches!(err, TicketError::Validation { ref field, .. } if field == "issue_title"));
    }

    #[test]
    fn test_multiple_validation_errors_kept() {
        let err = TicketError::from_validation_errors(vec![
            ValidationError::new("issue_title", "cannot be empty"),
            ValidationError::new("created_by", "cannot be empty"),
        ]);
        assert!(matches!(err, TicketError::ValidationErrors { ref errors } if errors.len() == 2));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(TicketError::InvalidId { id: "x".into() }.is_not_found());
        assert!(!TicketError::Storage("boom".into()).is_not_found());
    }
}
