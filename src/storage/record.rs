//! Record types held in the document

use serde::{Deserialize, Serialize};

/// Maximum chirp length in characters (checked by the HTTP layer)
pub const MAX_CHIRP_LENGTH: usize = 140;

/// A stored short text post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: u64,
    pub body: String,
}

/// A stored user account
///
/// Older database files name the hash field `password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(rename = "password_hash", alias = "password")]
    pub password_hash: String,
}

/// The part of a user that may leave the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: u64,
    pub email: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_public_drops_hash() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
        };

        let json = serde_json::to_string(&UserPublic::from(&user)).unwrap();
        assert_eq!(json, r#"{"id":1,"email":"a@example.com"}"#);
    }

    #[test]
    fn test_user_reads_legacy_password_field() {
        let user: User =
            serde_json::from_str(r#"{"id":3,"email":"b@example.com","password":"$2a$12$x"}"#)
                .unwrap();
        assert_eq!(user.password_hash, "$2a$12$x");

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"password_hash\""));
    }
}
