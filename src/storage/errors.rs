//! Storage error types
//!
//! - `Io`: the database file could not be opened, read, written or renamed
//! - `Serialization`: on-disk content is not a valid document
//! - `NotFound`: id or email lookup miss
//! - `Unauthorized`: password check failed during login
//! - `EmailTaken`: a user with that email already exists
//!
//! Display strings are safe to show to clients; paths and OS error
//! detail only appear through `source()` and the `context` field.

use std::io;

use thiserror::Error;

use crate::auth::AuthError;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// File I/O failed
    #[error("storage I/O failure")]
    Io {
        /// What the store was doing, including the path
        context: String,
        #[source]
        source: io::Error,
    },

    /// Database file does not hold a valid document
    #[error("storage document is invalid")]
    Serialization(String),

    /// No record matched the lookup
    #[error("{0} not found")]
    NotFound(String),

    /// Credentials did not match
    #[error("Invalid credentials")]
    Unauthorized,

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Store lock was poisoned by a panicking writer
    #[error("storage lock poisoned")]
    LockPoisoned,

    /// Password hashing failed while creating a user
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl StorageError {
    /// Create an I/O error with context
    pub fn io_error(context: impl Into<String>, source: io::Error) -> Self {
        StorageError::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        StorageError::Serialization(reason.into())
    }

    /// Chirp lookup miss
    pub fn chirp_not_found(id: u64) -> Self {
        StorageError::NotFound(format!("chirp {}", id))
    }

    /// User lookup miss
    pub fn user_not_found() -> Self {
        StorageError::NotFound("user".to_string())
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StorageError::NotFound(_) => 404,
            StorageError::Unauthorized => 401,
            StorageError::EmailTaken => 409,
            StorageError::Auth(e) => e.status_code(),
            StorageError::Io { .. } => 500,
            StorageError::Serialization(_) => 500,
            StorageError::LockPoisoned => 500,
        }
    }

    /// Returns whether this error was caused by the caller
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
