//! Error types for filevault.

use thiserror::Error;

/// Common error type for filevault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// A required request field is absent or structurally invalid.
    ///
    /// An unrecognized node type and undecodable base64 content are
    /// reported through this variant as well.
    #[error("Missing {0}")]
    MissingField(&'static str),

    /// The requested parent is not an existing folder.
    #[error("Parent not found")]
    ParentNotFound,

    /// Resource not found, or present but not accessible to the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// The caller's identity could not be resolved.
    #[error("Unauthorized")]
    Unauthorized,

    /// Content was requested from a folder.
    #[error("A folder doesn't have content")]
    FolderHasNoContent,

    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for VaultError {
    fn from(e: sqlx::Error) -> Self {
        VaultError::Database(e.to_string())
    }
}

/// Result type alias for filevault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
