//! # Session Tokens
//!
//! HS256 JSON Web Tokens identifying a user.
//!
//! A token is one of:
//! - valid: signature verifies and `now < exp`
//! - expired: signature verifies but `now >= exp`
//! - invalid: bad signature, wrong issuer, or unreadable claims
//!
//! Validation is stateless; whether the subject still exists is the
//! caller's concern.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};

/// Issuer embedded in every token
pub const TOKEN_ISSUER: &str = "chirpy";

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer
    pub iss: String,

    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
}

/// Issue a signed token for `subject_id` that expires after `ttl`
pub fn issue_token(subject_id: u64, secret: &str, ttl: Duration) -> AuthResult<String> {
    let now = Utc::now();
    let exp = now + ttl;

    let claims = JwtClaims {
        iss: TOKEN_ISSUER.to_string(),
        sub: subject_id.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::TokenGenerationFailed)
}

/// Validate a token and return the user id it was issued for
pub fn validate_token(token: &str, secret: &str) -> AuthResult<u64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.validate_aud = false;
    // Expiry is checked below with `now >= exp` and no leeway.
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::MalformedToken,
    })?;

    let claims = token_data.claims;
    if Utc::now().timestamp() >= claims.exp {
        return Err(AuthError::TokenExpired);
    }

    claims
        .sub
        .parse::<u64>()
        .map_err(|_| AuthError::MalformedToken)
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing
    pub secret: String,

    /// Lifetime used when the client does not ask for one
    pub default_ttl: Duration,

    /// Upper bound on any requested lifetime
    pub max_ttl: Duration,
}

impl JwtConfig {
    /// Create a config with the given secret and 24 hour lifetimes
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            default_ttl: Duration::hours(24),
            max_ttl: Duration::hours(24),
        }
    }
}

/// Token issuer/validator bound to one secret
#[derive(Debug, Clone)]
pub struct JwtManager {
    config: JwtConfig,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Resolve the lifetime for a login request
    ///
    /// Missing, zero or negative requests fall back to the default;
    /// anything above `max_ttl` is clamped.
    pub fn ttl_for(&self, requested_secs: Option<i64>) -> Duration {
        match requested_secs {
            Some(secs) if secs > 0 => {
                Duration::seconds(secs.min(self.config.max_ttl.num_seconds()))
            }
            _ => self.config.default_ttl,
        }
    }

    /// Issue a token for a user
    pub fn issue(&self, user_id: u64, requested_secs: Option<i64>) -> AuthResult<String> {
        issue_token(user_id, &self.config.secret, self.ttl_for(requested_secs))
    }

    /// Validate a token and extract the user id
    pub fn validate(&self, token: &str) -> AuthResult<u64> {
        validate_token(token, &self.config.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_testing_only";

    #[test]
    fn test_token_round_trip() {
        let token = issue_token(42, SECRET, Duration::minutes(15)).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(validate_token(&token, SECRET).unwrap(), 42);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(7, "secret_one", Duration::minutes(15)).unwrap();

        assert_eq!(
            validate_token(&token, "secret_two"),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let token = issue_token(7, SECRET, Duration::zero()).unwrap();

        assert_eq!(validate_token(&token, SECRET), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: "1".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_token(&token, SECRET), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_expired_token_with_wrong_secret_is_bad_signature() {
        let token = issue_token(7, SECRET, Duration::zero()).unwrap();

        assert_eq!(
            validate_token(&token, "other"),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert_eq!(
            validate_token("invalid.token.here", SECRET),
            Err(AuthError::MalformedToken)
        );
        assert_eq!(validate_token("", SECRET), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: "not-a-user-id".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_token(&token, SECRET), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: "someone-else".to_string(),
            sub: "1".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_token(&token, SECRET), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_ttl_resolution() {
        let manager = JwtManager::new(JwtConfig::new(SECRET));

        assert_eq!(manager.ttl_for(None), Duration::hours(24));
        assert_eq!(manager.ttl_for(Some(0)), Duration::hours(24));
        assert_eq!(manager.ttl_for(Some(-5)), Duration::hours(24));
        assert_eq!(manager.ttl_for(Some(60)), Duration::seconds(60));
        assert_eq!(manager.ttl_for(Some(10 * 24 * 3600)), Duration::hours(24));
        assert_eq!(manager.ttl_for(Some(i64::MAX)), Duration::hours(24));
    }

    #[test]
    fn test_manager_round_trip() {
        let manager = JwtManager::new(JwtConfig::new(SECRET));
        let token = manager.issue(3, Some(120)).unwrap();

        assert_eq!(manager.validate(&token).unwrap(), 3);
    }
}
