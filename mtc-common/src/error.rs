//! Common error types for the catalog services

use thiserror::Error;

/// Common result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the catalog services
///
/// Every multi-step write runs inside a single transaction, so none of
/// these imply partial effects; a failed operation rolls back in full.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or missing input; surfaced verbatim, never retried
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A referenced id does not exist (dangling tag, competency, member)
    #[error("Unknown reference: {0}")]
    Reference(String),

    /// Uniqueness conflict (duplicate tag name)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller lacks the required role for this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
