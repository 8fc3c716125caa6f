//! Enumeration helpers layered on top of the public facade.
//!
//! Unlike `read`/`write`/`compaction`, nothing here reaches into `State`
//! directly — every function is built purely from `Database`'s public
//! methods, the same way an external crate depending on this one would
//! have to build them.

use std::collections::HashMap;
use std::hash::Hash;

use serializer::Serializer;

use crate::{Database, DbError};

impl<T, S> Database<T, S>
where
    T: Send + Sync + 'static,
    S: Serializer<T> + 'static,
{
    /// Returns the raw byte-string keys currently live, in index order.
    pub fn keys(&self) -> Result<Vec<Vec<u8>>, DbError> {
        Ok(self.iterate()?.into_iter().map(|(k, _)| k).collect())
    }

    /// Returns the decoded values currently live, in index order.
    pub fn values(&self) -> Result<Vec<T>, DbError> {
        Ok(self.iterate()?.into_iter().map(|(_, v)| v).collect())
    }

    /// Collects every live entry into a `HashMap` keyed by the raw
    /// byte-string key. Convenient for tests and snapshots; loses the
    /// index's insertion order.
    pub fn to_map(&self) -> Result<HashMap<Vec<u8>, T>, DbError> {
        Ok(self.iterate()?.into_iter().collect())
    }

    /// Collects every live entry into a `Vec`, preserving index order. A
    /// thin, explicitly-named alias over [`Self::iterate`] for callers who
    /// want a snapshot rather than a live read.
    pub fn to_vec(&self) -> Result<Vec<(Vec<u8>, T)>, DbError> {
        self.iterate()
    }

    /// Deletes every live key for which `predicate` returns `false`.
    /// Built from `iterate`/`delete` like any other caller of the public
    /// facade: no engine-internal access.
    pub fn retain(&self, mut predicate: impl FnMut(&[u8], &T) -> bool) -> Result<(), DbError> {
        for (key, value) in self.iterate()? {
            if !predicate(&key, &value) {
                self.delete(&String::from_utf8_lossy(&key).into_owned())?;
            }
        }
        Ok(())
    }
}

/// Returns `true` if every key in `expected` maps to an equal value in
/// `db`, and `db` has no extra live keys. Exists mainly to give tests (and
/// any other caller that already has an expected snapshot) a one-line
/// comparison instead of hand-rolling a diff.
pub fn matches_snapshot<T, S, K>(db: &Database<T, S>, expected: &HashMap<K, T>) -> Result<bool, DbError>
where
    T: Send + Sync + PartialEq + 'static,
    S: Serializer<T> + 'static,
    K: AsRef<[u8]> + Eq + Hash,
{
    let actual = db.to_map()?;
    if actual.len() != expected.len() {
        return Ok(false);
    }
    for (k, v) in expected {
        match actual.get(k.as_ref()) {
            Some(actual_v) if actual_v == v => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}
