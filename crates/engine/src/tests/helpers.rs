use serializer::BincodeSerializer;
use tempfile::TempDir;

use crate::Database;

/// Opens a fresh string-valued database in a throwaway directory. The
/// returned `TempDir` must be kept alive for as long as the database is in
/// use; dropping it removes the directory.
pub fn open_string_db() -> (Database<String, BincodeSerializer<String>>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("db.daybreak")).unwrap();
    (db, dir)
}

/// Returns the path a fresh (unopened) database would live at inside a
/// throwaway directory, and the directory itself.
pub fn fresh_path() -> (std::path::PathBuf, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.daybreak");
    (path, dir)
}
