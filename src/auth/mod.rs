//! # Chirpy Auth Module
//!
//! Password hashing and signed session tokens. Both are pure functions
//! over their inputs; the signing secret is supplied by configuration.

pub mod crypto;
pub mod errors;
pub mod jwt;

pub use crypto::{hash_password, verify_password};
pub use errors::{AuthError, AuthResult};
pub use jwt::{issue_token, validate_token, JwtClaims, JwtConfig, JwtManager, TOKEN_ISSUER};
