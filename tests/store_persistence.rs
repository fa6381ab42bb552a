//! Record Store Persistence Tests
//!
//! - The document survives reopening unchanged
//! - A zero-length file is an empty document
//! - Malformed content fails explicitly and is never overwritten silently
//! - Files in the older unversioned layout still load

use chirpy::storage::{Document, RecordStore, StorageError, CURRENT_VERSION};
use std::fs;
use tempfile::TempDir;

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[test]
fn test_reopen_yields_identical_document() {
    let dir = create_temp_data_dir();
    let path = dir.path().join("database.json");

    {
        let store = RecordStore::open(&path).unwrap();
        store.create_chirp("first").unwrap();
        store.create_chirp("second").unwrap();
        store.create_user("a@example.com", "secret").unwrap();
    }

    let before = Document::from_bytes(&fs::read(&path).unwrap()).unwrap();

    let store = RecordStore::open(&path).unwrap();
    let chirps = store.list_chirps().unwrap();
    assert_eq!(chirps.len(), 2);
    assert_eq!(chirps[0].body, "first");
    assert_eq!(chirps[1].body, "second");
    assert_eq!(store.get_user(1).unwrap().email, "a@example.com");

    let after = Document::from_bytes(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(before, after);
    assert_eq!(after.version, CURRENT_VERSION);
}

#[test]
fn test_on_disk_layout() {
    let dir = create_temp_data_dir();
    let store = RecordStore::open(dir.path().join("database.json")).unwrap();
    store.create_chirp("hello").unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();

    assert_eq!(raw["version"], 1);
    assert_eq!(raw["chirps"]["1"]["id"], 1);
    assert_eq!(raw["chirps"]["1"]["body"], "hello");
    assert!(raw["users"].as_object().unwrap().is_empty());
}

#[test]
fn test_empty_file_is_empty_store() {
    let dir = create_temp_data_dir();
    let path = dir.path().join("database.json");
    fs::write(&path, b"").unwrap();

    let store = RecordStore::open(&path).unwrap();
    assert!(store.list_chirps().unwrap().is_empty());
    assert!(matches!(store.get_chirp(999), Err(StorageError::NotFound(_))));
    assert_eq!(store.create_chirp("first").unwrap().id, 1);
}

#[test]
fn test_malformed_file_fails_and_is_preserved() {
    let dir = create_temp_data_dir();
    let path = dir.path().join("database.json");
    fs::write(&path, b"{\"chirps\": [not json").unwrap();

    let store = RecordStore::open(&path).unwrap();

    assert!(matches!(store.list_chirps(), Err(StorageError::Serialization(_))));
    assert!(matches!(
        store.create_chirp("lost?"),
        Err(StorageError::Serialization(_))
    ));
    assert!(matches!(
        store.authenticate_user("a@example.com", "x"),
        Err(StorageError::Serialization(_))
    ));

    // Failed writes leave the bad file for an operator to inspect
    assert_eq!(fs::read(&path).unwrap(), b"{\"chirps\": [not json");
}

#[test]
fn test_structurally_invalid_file_rejected() {
    let dir = create_temp_data_dir();
    let path = dir.path().join("database.json");
    fs::write(&path, br#"{"chirps":{"1":{"id":7,"body":"x"}}}"#).unwrap();

    let store = RecordStore::open(&path).unwrap();
    assert!(matches!(store.list_chirps(), Err(StorageError::Serialization(_))));
}

#[test]
fn test_legacy_layout_loads_and_upgrades() {
    let dir = create_temp_data_dir();
    let path = dir.path().join("database.json");
    fs::write(
        &path,
        br#"{"chirps":{"1":{"id":1,"body":"old"},"2":{"id":2,"body":"older"}},"users":null}"#,
    )
    .unwrap();

    let store = RecordStore::open(&path).unwrap();
    assert_eq!(store.list_chirps().unwrap().len(), 2);

    let chirp = store.create_chirp("new").unwrap();
    assert_eq!(chirp.id, 3);

    let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], CURRENT_VERSION);
    assert!(raw["users"].is_object());
}

#[test]
fn test_listing_tolerates_id_gaps() {
    let dir = create_temp_data_dir();
    let path = dir.path().join("database.json");
    fs::write(
        &path,
        br#"{"chirps":{"1":{"id":1,"body":"a"},"3":{"id":3,"body":"c"}}}"#,
    )
    .unwrap();

    let store = RecordStore::open(&path).unwrap();
    let ids: Vec<u64> = store.list_chirps().unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 3]);

    // Next id follows the largest id, never reusing the gap
    assert_eq!(store.create_chirp("d").unwrap().id, 4);
}

#[test]
fn test_full_id_space_fails_without_touching_file() {
    let dir = create_temp_data_dir();
    let path = dir.path().join("database.json");
    let raw = br#"{"chirps":{"18446744073709551615":{"id":18446744073709551615,"body":"last"}}}"#;
    fs::write(&path, raw).unwrap();

    let store = RecordStore::open(&path).unwrap();
    assert!(matches!(
        store.create_chirp("overflow"),
        Err(StorageError::Serialization(_))
    ));
    assert_eq!(fs::read(&path).unwrap(), raw.to_vec());
}
