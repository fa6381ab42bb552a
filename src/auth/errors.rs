//! # Auth Errors
//!
//! Error types for password hashing and session tokens.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Credential and token errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Credential Errors
    // ==================

    /// Password did not match the stored hash (or the hash was unreadable)
    #[error("Invalid credentials")]
    PasswordMismatch,

    // ==================
    // Token Errors
    // ==================

    /// Token is malformed, has the wrong issuer, or carries an unparsable subject
    #[error("Malformed token")]
    MalformedToken,

    /// Token has expired
    #[error("Token expired")]
    TokenExpired,

    /// Token signature does not verify against the secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Request carried no bearer token
    #[error("Authentication required")]
    AuthenticationRequired,

    // ==================
    // Internal Errors
    // ==================

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::PasswordMismatch => 401,
            AuthError::MalformedToken => 401,
            AuthError::TokenExpired => 401,
            AuthError::InvalidSignature => 401,
            AuthError::AuthenticationRequired => 401,

            AuthError::HashingFailed => 500,
            AuthError::TokenGenerationFailed => 500,
        }
    }

    /// Returns whether this error was caused by the caller
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
