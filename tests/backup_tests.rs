//! Integration tests for backup archives.

use std::fs;

use strongbox::backup::{create_backup, file_checksum, list_backups, restore_backup, sidecar_path};
use strongbox::errors::StrongboxError;
use strongbox::vault::{load_store, save_store, SecretEntry, SecretStore};
use tempfile::TempDir;

const PASS: &str = "backup-test-pass";

#[test]
fn backup_and_restore_round_trip_a_store() {
    let home = TempDir::new().unwrap();
    let store_path = home.path().join("store.dat");
    let backup_dir = home.path().join("backups");

    let mut store = SecretStore::new();
    store
        .insert(SecretEntry::new("token", "abc123", "api"))
        .unwrap();
    save_store(&store_path, PASS, &store).unwrap();

    let info = create_backup(home.path(), &backup_dir).unwrap();
    assert_eq!(
        info.checksum.as_deref(),
        Some(file_checksum(&info.path).unwrap().as_str())
    );

    let listed = list_backups(&backup_dir).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].path, info.path);

    let target = TempDir::new().unwrap();
    let restored = restore_backup(&info.path, target.path()).unwrap();
    assert_eq!(restored, 1);

    let reloaded = load_store(&target.path().join("store.dat"), PASS).unwrap();
    assert_eq!(reloaded, store);
}

#[test]
fn restore_rejects_checksum_mismatch() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("store.dat"), b"not really a store").unwrap();
    let info = create_backup(home.path(), &home.path().join("backups")).unwrap();

    fs::write(
        sidecar_path(&info.path),
        format!("{}  {}\n", "0".repeat(64), info.name),
    )
    .unwrap();

    let target = TempDir::new().unwrap();
    match restore_backup(&info.path, target.path()) {
        Err(StrongboxError::ChecksumMismatch { expected, .. }) => {
            assert_eq!(expected, "0".repeat(64));
        }
        other => panic!("expected checksum mismatch, got {other:?}"),
    }
}

#[test]
fn restore_without_sidecar_is_allowed() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("store.dat"), b"bytes").unwrap();
    let info = create_backup(home.path(), &home.path().join("backups")).unwrap();
    fs::remove_file(sidecar_path(&info.path)).unwrap();

    let target = TempDir::new().unwrap();
    assert_eq!(restore_backup(&info.path, target.path()).unwrap(), 1);
}
