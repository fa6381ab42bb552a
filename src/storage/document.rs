//! The database document
//!
//! The whole database is one JSON object:
//!
//! ```json
//! {"version":1,"chirps":{"1":{"id":1,"body":"..."}},"users":{"1":{...}}}
//! ```
//!
//! Files written before the `version` field existed load as version 1,
//! and a `null` collection loads as empty. A zero-length file is an empty
//! document. Anything else that fails to parse or validate is rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::errors::{StorageError, StorageResult};
use super::record::{Chirp, User};

/// Document schema version written by this build
pub const CURRENT_VERSION: u32 = 1;

fn legacy_version() -> u32 {
    1
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<BTreeMap<u64, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<BTreeMap<u64, T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Full database state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default = "legacy_version")]
    pub version: u32,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub chirps: BTreeMap<u64, Chirp>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: BTreeMap<u64, User>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            chirps: BTreeMap::new(),
            users: BTreeMap::new(),
        }
    }
}

impl Document {
    /// Decode and validate file contents
    pub fn from_bytes(bytes: &[u8]) -> StorageResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }

        let document: Document = serde_json::from_slice(bytes)?;
        document.validate()?;
        Ok(document)
    }

    /// Encode for writing
    pub fn to_bytes(&self) -> StorageResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Check structural invariants that serde cannot express
    pub fn validate(&self) -> StorageResult<()> {
        if self.version != CURRENT_VERSION {
            return Err(StorageError::invalid_document(format!(
                "unsupported document version {}",
                self.version
            )));
        }

        for (key, chirp) in &self.chirps {
            check_key("chirp", *key, chirp.id)?;
        }
        for (key, user) in &self.users {
            check_key("user", *key, user.id)?;
        }

        Ok(())
    }

    /// Next free chirp id: one past the largest existing id
    pub fn next_chirp_id(&self) -> StorageResult<u64> {
        next_id(&self.chirps, "chirp")
    }

    /// Next free user id: one past the largest existing id
    pub fn next_user_id(&self) -> StorageResult<u64> {
        next_id(&self.users, "user")
    }

    /// Insert a chirp under the next id
    pub fn insert_chirp(&mut self, body: String) -> StorageResult<Chirp> {
        let chirp = Chirp {
            id: self.next_chirp_id()?,
            body,
        };
        self.chirps.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    /// Insert a user under the next id
    pub fn insert_user(&mut self, email: String, password_hash: String) -> StorageResult<User> {
        let user = User {
            id: self.next_user_id()?,
            email,
            password_hash,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// All chirps in ascending id order
    pub fn chirps_ascending(&self) -> Vec<Chirp> {
        self.chirps.values().cloned().collect()
    }

    /// First user (lowest id) with this email
    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }
}

fn check_key(kind: &str, key: u64, id: u64) -> StorageResult<()> {
    if key == 0 {
        return Err(StorageError::invalid_document(format!("{} id 0 is reserved", kind)));
    }
    if key != id {
        return Err(StorageError::invalid_document(format!(
            "{} stored under key {} has id {}",
            kind, key, id
        )));
    }
    Ok(())
}

fn next_id<T>(records: &BTreeMap<u64, T>, kind: &str) -> StorageResult<u64> {
    match records.keys().next_back() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| StorageError::invalid_document(format!("{} ids exhausted", kind))),
    }
}
