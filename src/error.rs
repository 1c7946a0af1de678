//! Error types for cluster image introspection.

use std::time::Duration;

/// Result type alias for imagespect operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or querying image metadata.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Image Reference Errors
    // =========================================================================
    /// Failed to parse an image reference.
    #[error("invalid image reference '{reference}': {reason}")]
    InvalidImageReference { reference: String, reason: String },

    // =========================================================================
    // Cluster Errors
    // =========================================================================
    /// A cluster API call failed. Surfaced immediately, never retried.
    #[error("cluster {operation} failed: {reason}")]
    Cluster { operation: String, reason: String },

    /// Image stream tag absent after the fixed-delay wait.
    #[error("image stream tag not found: {0}")]
    TagNotFound(String),

    /// Readiness poll exhausted its time budget.
    #[error("operation timed out after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // =========================================================================
    // Metadata Document Errors
    // =========================================================================
    /// Required document path is absent or empty.
    #[error("metadata field missing or empty: {path}")]
    MissingField { path: String },

    /// Document value is present but not in the expected format.
    #[error("malformed metadata value at {path}: '{value}' ({reason})")]
    MalformedField {
        path: String,
        value: String,
        reason: String,
    },

    // =========================================================================
    // Volume Builder Errors
    // =========================================================================
    /// Builder input violated a constraint.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
