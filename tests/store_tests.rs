//! Integration tests for the encrypted store codec.

use std::fs;

use strongbox::errors::StrongboxError;
use strongbox::vault::format::HEADER_LEN;
use strongbox::vault::{load_store, save_store, SecretEntry, SecretStore, SecretUpdate};
use tempfile::TempDir;

const PASS: &str = "correct horse battery staple";

fn sample_store() -> SecretStore {
    let mut store = SecretStore::new();
    store
        .insert(SecretEntry::new("github", "ghp_123", "dev"))
        .unwrap();
    store
        .insert(SecretEntry::new("bank", "s3cr3t", "finance"))
        .unwrap();
    store.insert(SecretEntry::new("wifi", "guest", "")).unwrap();
    store
}

#[test]
fn save_then_load_round_trips_order_and_fields() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.dat");
    let store = sample_store();

    save_store(&path, PASS, &store).unwrap();
    let loaded = load_store(&path, PASS).unwrap();

    assert_eq!(loaded, store);
    let names: Vec<&str> = loaded.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["github", "bank", "wifi"]);
}

#[test]
fn wrong_passphrase_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.dat");
    save_store(&path, PASS, &sample_store()).unwrap();

    let result = load_store(&path, "not the passphrase");
    assert!(matches!(
        result,
        Err(StrongboxError::InvalidPassphraseOrCorruptData)
    ));
}

#[test]
fn bit_flips_are_detected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.dat");
    save_store(&path, PASS, &SecretStore::new()).unwrap();
    let original = fs::read(&path).unwrap();

    // Salt, nonce, first ciphertext byte and last tag byte.
    for i in [0, 16, HEADER_LEN, original.len() - 1] {
        let mut tampered = original.clone();
        tampered[i] ^= 0x01;
        fs::write(&path, &tampered).unwrap();

        let result = load_store(&path, PASS);
        assert!(
            matches!(result, Err(StrongboxError::InvalidPassphraseOrCorruptData)),
            "flip at byte {i} was not detected"
        );
    }
}

#[test]
fn salt_is_stable_across_saves() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.dat");
    let mut store = sample_store();

    save_store(&path, PASS, &store).unwrap();
    let first = fs::read(&path).unwrap();

    store
        .update(
            "wifi",
            SecretUpdate {
                value: Some("new-guest".into()),
                category: None,
            },
        )
        .unwrap();
    save_store(&path, PASS, &store).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first[..16], second[..16], "salt must be reused");
    assert_ne!(first[16..28], second[16..28], "nonce must be fresh");
    assert_ne!(first[28..], second[28..]);
}

#[test]
fn missing_and_empty_files_load_as_empty_store() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.dat");

    let missing = load_store(&path, PASS).unwrap();
    assert!(missing.is_empty());
    assert!(!path.exists(), "loading must not create the file");

    fs::write(&path, b"").unwrap();
    let empty = load_store(&path, PASS).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.version, 1);
}

#[test]
fn files_shorter_than_header_are_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.dat");

    for len in [1, 16, HEADER_LEN - 1] {
        fs::write(&path, vec![0u8; len]).unwrap();
        assert!(
            matches!(load_store(&path, PASS), Err(StrongboxError::CorruptStore(_))),
            "{len}-byte file should be corrupt"
        );
        // Saving must not mine a salt out of a corrupt file.
        assert!(save_store(&path, PASS, &SecretStore::new()).is_err());
    }
}

#[test]
fn duplicate_insert_never_reaches_disk() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.dat");
    let mut store = sample_store();
    save_store(&path, PASS, &store).unwrap();
    let before = fs::read(&path).unwrap();

    let result = store.insert(SecretEntry::new("github", "other", ""));
    assert!(matches!(result, Err(StrongboxError::SecretAlreadyExists(_))));

    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(store.len(), 3);
}

#[cfg(unix)]
#[test]
fn saved_store_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested/store.dat");
    save_store(&path, PASS, &SecretStore::new()).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    let dir_mode = fs::metadata(path.parent().unwrap())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(dir_mode & 0o777, 0o700);
}
