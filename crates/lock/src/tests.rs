use super::*;
use std::fs::{self, OpenOptions};
use tempfile::tempdir;

#[test]
fn shared_lock_acquires_and_releases() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.journal");
    fs::write(&path, b"hello").unwrap();
    let file = File::open(&path).unwrap();

    {
        let _guard = SharedGuard::acquire(&file).unwrap();
    }
    // lock released on drop; acquiring again must not block/deadlock
    let _guard2 = SharedGuard::acquire(&file).unwrap();
}

#[test]
fn exclusive_lock_acquires_and_releases() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.journal");
    fs::write(&path, b"hello").unwrap();
    let file = File::open(&path).unwrap();

    {
        let _guard = ExclusiveGuard::acquire(&file).unwrap();
    }
    let _guard2 = ExclusiveGuard::acquire(&file).unwrap();
}

#[test]
fn live_file_is_not_unlinked() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.journal");
    fs::write(&path, b"hello").unwrap();
    let file = File::open(&path).unwrap();

    assert!(!is_unlinked(&file).unwrap());
}

#[cfg(unix)]
#[test]
fn removed_file_is_detected_as_unlinked() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.journal");
    fs::write(&path, b"hello").unwrap();
    let file = File::open(&path).unwrap();

    fs::remove_file(&path).unwrap();

    assert!(is_unlinked(&file).unwrap());
}

#[cfg(unix)]
#[test]
fn rename_over_path_unlinks_old_handle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.journal");
    let tmp_path = dir.path().join("db.journal.tmp");
    fs::write(&path, b"hello").unwrap();

    let original = File::open(&path).unwrap();
    assert!(!is_unlinked(&original).unwrap());

    // simulate a compaction rename replacing the file at `path`
    OpenOptions::new()
        .create(true)
        .write(true)
        .open(&tmp_path)
        .unwrap();
    fs::rename(&tmp_path, &path).unwrap();

    assert!(is_unlinked(&original).unwrap());

    let reopened = File::open(&path).unwrap();
    assert!(!is_unlinked(&reopened).unwrap());
}
