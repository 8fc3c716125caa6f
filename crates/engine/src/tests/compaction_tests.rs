use std::fs;

use serializer::{BincodeSerializer, Serializer};

use super::helpers::{fresh_path, open_string_db};
use crate::{DbError, Database};

#[test]
fn compact_shrinks_journal_to_live_entries() -> Result<(), DbError> {
    let (db, _dir) = open_string_db();
    for i in 0..20 {
        db.set(&format!("k{i}"), format!("v{i}"))?;
    }
    for i in 0..15 {
        db.set(&format!("k{i}"), format!("v{i}-overwritten"))?;
    }
    for i in 0..10 {
        db.delete(&format!("k{i}"))?;
    }
    db.sync()?;
    let size_before = fs::metadata(db.path())?.len();

    db.compact()?;

    let size_after = fs::metadata(db.path())?.len();
    assert!(
        size_after < size_before,
        "compact should shrink the journal ({size_after} was not < {size_before})"
    );
    assert_eq!(db.size(), 10);
    for i in 10..15 {
        assert_eq!(db.get(&format!("k{i}"))?, Some(format!("v{i}-overwritten")));
    }
    for i in 15..20 {
        assert_eq!(db.get(&format!("k{i}"))?, Some(format!("v{i}")));
    }
    for i in 0..10 {
        assert_eq!(db.get(&format!("k{i}"))?, None);
    }
    Ok(())
}

#[test]
fn compact_result_survives_reopen() -> Result<(), DbError> {
    let (path, _dir) = fresh_path();
    {
        let db: Database<String> = Database::open(&path)?;
        for i in 0..5 {
            db.set(&format!("k{i}"), format!("v{i}"))?;
        }
        db.delete("k0")?;
        db.compact()?;
        db.close()?;
    }

    let reopened: Database<String> = Database::open(&path)?;
    assert_eq!(reopened.size(), 4);
    assert_eq!(reopened.get("k0")?, None);
    assert_eq!(reopened.get("k4")?, Some("v4".to_string()));
    Ok(())
}

#[test]
fn clear_empties_the_database_and_truncates_the_journal() -> Result<(), DbError> {
    let (db, _dir) = open_string_db();
    db.set("a", "1".to_string())?;
    db.set("b", "2".to_string())?;
    db.sync()?;

    db.clear()?;

    assert_eq!(db.size(), 0);
    assert_eq!(db.get("a")?, None);

    let header_len =
        journal::Header::new(BincodeSerializer::<String>::new().format_name()).len() as u64;
    let on_disk = fs::metadata(db.path())?.len();
    assert_eq!(on_disk, header_len);
    Ok(())
}

#[test]
fn a_second_handle_sees_a_compaction_after_sync() -> Result<(), DbError> {
    let (path, _dir) = fresh_path();
    let a: Database<String> = Database::open(&path)?;
    let b: Database<String> = Database::open(&path)?;

    a.set_sync("k", "v1".to_string())?;
    a.set_sync("k", "v2".to_string())?;
    b.sync()?;
    assert_eq!(b.get("k")?, Some("v2".to_string()));

    a.compact()?;

    b.sync()?;
    assert_eq!(b.get("k")?, Some("v2".to_string()));
    Ok(())
}
