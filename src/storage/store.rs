//! Record store over a single JSON file
//!
//! Every mutation is a full read-modify-write of the document under the
//! exclusive side of a process-wide `RwLock`: load, compute the next id,
//! insert, serialize, write. Readers take the shared side, load a fresh
//! snapshot and drop it when the call returns; nothing is cached between
//! calls.
//!
//! Writes go to a sibling temp file which is fsynced and then renamed over
//! the database file, so any reader observes either the old document or
//! the new one, never a partial write.
//!
//! The lock belongs to the file, not the handle: every `RecordStore` opened
//! on the same path in this process shares one `RwLock`.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::auth::{hash_password, verify_password};

use super::document::Document;
use super::errors::{StorageError, StorageResult};
use super::record::{Chirp, UserPublic};

/// Durable store for chirps and users
#[derive(Debug)]
pub struct RecordStore {
    /// Path to the database file
    path: PathBuf,

    /// Path to the temp file used during atomic replace
    temp_path: PathBuf,

    /// Serializes writers; readers share. Shared by all handles on `path`.
    lock: Arc<RwLock<()>>,
}

type LockRegistry = Mutex<HashMap<PathBuf, Arc<RwLock<()>>>>;

/// The process-wide lock for the database file at `path`
fn shared_lock(path: &Path) -> Arc<RwLock<()>> {
    static REGISTRY: OnceLock<LockRegistry> = OnceLock::new();

    let registry = REGISTRY.get_or_init(Default::default);
    // The map only holds unit locks, so a poisoned guard is still usable.
    let mut locks = registry.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(lock_key(path)).or_default())
}

/// Canonical form of `path`, stable whether or not the file exists yet
///
/// The deepest existing ancestor is canonicalized and the missing
/// components are appended to it.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

impl RecordStore {
    /// Create a store handle without touching the file system
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let mut temp_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "database.json".into());
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);
        let lock = shared_lock(&path);

        Self {
            path,
            temp_path,
            lock,
        }
    }

    /// Create a store handle and make sure the database file exists
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let store = Self::new(path);
        store.ensure_initialized()?;
        Ok(store)
    }

    /// Path to the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty database file if none exists
    ///
    /// Existing content is never truncated.
    pub fn ensure_initialized(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::io_error(
                        format!("create directory {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| {
                StorageError::io_error(format!("create {}", self.path.display()), e)
            })?;

        Ok(())
    }

    /// Store a new chirp under the next free id
    ///
    /// The body is stored as given; length is checked by the caller.
    pub fn create_chirp(&self, body: &str) -> StorageResult<Chirp> {
        let _guard = self.write_guard()?;
        self.ensure_initialized()?;

        let mut document = self.load()?;
        let chirp = document.insert_chirp(body.to_string())?;
        self.persist(&document)?;

        tracing::debug!(chirp_id = chirp.id, "chirp created");
        Ok(chirp)
    }

    /// All chirps in ascending id order
    pub fn list_chirps(&self) -> StorageResult<Vec<Chirp>> {
        let _guard = self.read_guard()?;
        Ok(self.load()?.chirps_ascending())
    }

    /// Look up one chirp
    pub fn get_chirp(&self, id: u64) -> StorageResult<Chirp> {
        let _guard = self.read_guard()?;
        self.load()?
            .chirps
            .remove(&id)
            .ok_or_else(|| StorageError::chirp_not_found(id))
    }

    /// Register a user, storing only the password hash
    ///
    /// Fails with `EmailTaken` if the email is already registered.
    pub fn create_user(&self, email: &str, password: &str) -> StorageResult<UserPublic> {
        // Hashing is slow and independent of the document; keep it outside the lock.
        let password_hash = hash_password(password)?;

        let _guard = self.write_guard()?;
        self.ensure_initialized()?;

        let mut document = self.load()?;
        if document.find_user_by_email(email).is_some() {
            return Err(StorageError::EmailTaken);
        }

        let user = document.insert_user(email.to_string(), password_hash)?;
        self.persist(&document)?;

        tracing::debug!(user_id = user.id, "user created");
        Ok(UserPublic::from(&user))
    }

    /// Check an email/password pair
    pub fn authenticate_user(&self, email: &str, password: &str) -> StorageResult<UserPublic> {
        let user = {
            let _guard = self.read_guard()?;
            self.load()?
                .find_user_by_email(email)
                .cloned()
                .ok_or_else(StorageError::user_not_found)?
        };

        verify_password(password, &user.password_hash).map_err(|_| StorageError::Unauthorized)?;

        Ok(UserPublic::from(&user))
    }

    /// Look up one user by id
    pub fn get_user(&self, id: u64) -> StorageResult<UserPublic> {
        let _guard = self.read_guard()?;
        self.load()?
            .users
            .get(&id)
            .map(UserPublic::from)
            .ok_or_else(StorageError::user_not_found)
    }

    fn read_guard(&self) -> StorageResult<RwLockReadGuard<'_, ()>> {
        self.lock.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write_guard(&self) -> StorageResult<RwLockWriteGuard<'_, ()>> {
        self.lock.write().map_err(|_| StorageError::LockPoisoned)
    }

    /// Read and validate the current document
    fn load(&self) -> StorageResult<Document> {
        let bytes = fs::read(&self.path)
            .map_err(|e| StorageError::io_error(format!("read {}", self.path.display()), e))?;
        Document::from_bytes(&bytes)
    }

    /// Replace the database file with `document`
    ///
    /// 1. Write to temp file
    /// 2. fsync temp file
    /// 3. Rename temp over the database file
    /// 4. fsync the parent directory so the rename survives a crash
    fn persist(&self, document: &Document) -> StorageResult<()> {
        let bytes = document.to_bytes()?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| {
                StorageError::io_error(format!("create {}", self.temp_path.display()), e)
            })?;

        file.write_all(&bytes).map_err(|e| {
            StorageError::io_error(format!("write {}", self.temp_path.display()), e)
        })?;
        file.sync_all().map_err(|e| {
            StorageError::io_error(format!("fsync {}", self.temp_path.display()), e)
        })?;
        drop(file);

        if let Err(e) = fs::rename(&self.temp_path, &self.path) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(StorageError::io_error(
                format!("rename onto {}", self.path.display()),
                e,
            ));
        }

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, RecordStore) {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::open(dir.path().join("database.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_empty_file() {
        let (_dir, store) = temp_store();
        assert!(store.path().exists());
        assert_eq!(fs::read(store.path()).unwrap().len(), 0);
        assert!(store.list_chirps().unwrap().is_empty());
    }

    #[test]
    fn test_ensure_initialized_keeps_data() {
        let (_dir, store) = temp_store();
        store.create_chirp("keep me").unwrap();

        store.ensure_initialized().unwrap();

        assert_eq!(store.list_chirps().unwrap().len(), 1);
    }

    #[test]
    fn test_open_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::open(dir.path().join("nested/deeper/db.json")).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_chirp_ids_are_sequential() {
        let (_dir, store) = temp_store();
        assert_eq!(store.create_chirp("first").unwrap().id, 1);
        assert_eq!(store.create_chirp("second").unwrap().id, 2);
        assert_eq!(store.get_chirp(2).unwrap().body, "second");
    }

    #[test]
    fn test_get_missing_chirp_is_not_found() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.get_chirp(999), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_temp_file_does_not_linger() {
        let (dir, store) = temp_store();
        store.create_chirp("x").unwrap();
        assert!(!dir.path().join("database.json.tmp").exists());
    }

    #[test]
    fn test_write_recreates_deleted_file() {
        let (_dir, store) = temp_store();
        fs::remove_file(store.path()).unwrap();

        assert!(matches!(store.list_chirps(), Err(StorageError::Io { .. })));
        assert_eq!(store.create_chirp("back").unwrap().id, 1);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_dir, store) = temp_store();
        store.create_user("a@example.com", "secret").unwrap();

        assert!(matches!(
            store.create_user("a@example.com", "other"),
            Err(StorageError::EmailTaken)
        ));
    }

    #[test]
    fn test_password_not_stored_in_plaintext() {
        let (_dir, store) = temp_store();
        store.create_user("a@example.com", "hunter2hunter2").unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("hunter2hunter2"));
        assert!(raw.contains("$argon2id$"));
    }

    #[test]
    fn test_handles_on_one_path_share_a_lock() {
        let dir = TempDir::new().unwrap();
        let first = RecordStore::open(dir.path().join("database.json")).unwrap();
        let second = RecordStore::open(dir.path().join("./database.json")).unwrap();
        let other = RecordStore::open(dir.path().join("other.json")).unwrap();

        assert!(Arc::ptr_eq(&first.lock, &second.lock));
        assert!(!Arc::ptr_eq(&first.lock, &other.lock));
    }

    #[test]
    fn test_lock_key_stable_across_creation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("later/database.json");

        let before = lock_key(&path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();

        assert_eq!(before, lock_key(&path));
    }

    #[test]
    fn test_get_user() {
        let (_dir, store) = temp_store();
        let created = store.create_user("a@example.com", "secret").unwrap();

        assert_eq!(store.get_user(created.id).unwrap(), created);
        assert!(matches!(store.get_user(42), Err(StorageError::NotFound(_))));
    }
}
