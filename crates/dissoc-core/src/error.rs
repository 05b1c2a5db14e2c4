//! Error types for neurodissoc.

use thiserror::Error;

/// Result type alias using neurodissoc's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for neurodissoc operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input (malformed coordinates, empty terms, unsafe identifiers)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
