//! # Password Hashing
//!
//! One-way, salted password hashing with Argon2id.
//!
//! Plaintext passwords never leave this module: callers store the PHC
//! string returned by [`hash_password`] and check candidates with
//! [`verify_password`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::errors::{AuthError, AuthResult};

/// Hash a password using Argon2id with a fresh random salt
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashingFailed)
}

/// Verify a password against its stored hash
///
/// A malformed hash is reported the same way as a wrong password.
/// The comparison itself is constant-time (via the argon2 crate).
pub fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordMismatch)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::PasswordMismatch)
}
