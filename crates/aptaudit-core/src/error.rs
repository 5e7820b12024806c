//! Error types for aptaudit.

use thiserror::Error;

/// The main error type for aptaudit operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Index update failed: {0}")]
    IndexUpdateFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
