//! Error types for newswire.

use thiserror::Error;

/// Common error type for newswire.
#[derive(Error, Debug)]
pub enum NewswireError {
    /// Database error.
    ///
    /// Raised when an existence check, insert, or batch commit fails.
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Page fetch error (transport failure, timeout, or non-success status).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for NewswireError {
    fn from(e: sqlx::Error) -> Self {
        NewswireError::Database(e.to_string())
    }
}

/// Result type alias for newswire operations.
pub type Result<T> = std::result::Result<T, NewswireError>;
