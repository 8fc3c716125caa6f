//! # Index — the in-memory mirror of the journal's latest state
//!
//! `Index` is the mapping from key to value that the engine keeps folding
//! journal records into as it replays them (§4.4) and mutates directly on
//! every `set`/`delete` before the corresponding record is even enqueued
//! (§5, "the in-memory index is updated before the record is enqueued").
//!
//! Unlike a sorted structure, iteration order here is **insertion order of
//! the most recent mutation**, not key order: a `delete` followed by a new
//! `set` on the same key moves that key to the end of the iteration order,
//! exactly as if it had never been set before. [`indexmap::IndexMap`]
//! already tracks insertion order, but overwriting an existing key through
//! its plain `insert` leaves the key in its original position — so `set`
//! here explicitly removes the old entry first when the key already
//! exists, to get the "moves to the end on re-assignment" behavior the
//! journal's replay order implies.

use indexmap::IndexMap;

/// An insertion-ordered key-value mapping mirroring a journal's folded
/// state.
#[derive(Debug, Default, Clone)]
pub struct Index {
    map: IndexMap<Vec<u8>, Vec<u8>>,
}

impl Index {
    /// Creates an empty index.
    pub fn new() -> Self {
        Index {
            map: IndexMap::new(),
        }
    }

    /// Looks up `key`, returning its current value if live.
    pub fn get(&self, key: &[u8]) -> Option<&Vec<u8>> {
        self.map.get(key)
    }

    /// Returns `true` if `key` currently has a live value.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` if there are no live keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Assigns `value` to `key`, folding a *Put* record into the index.
    ///
    /// If `key` already has a value, it is moved to the most-recent
    /// (last) position in iteration order, matching the semantics of a
    /// key being re-written in the journal.
    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.map.shift_remove(&key);
        self.map.insert(key, value);
    }

    /// Removes `key`, folding a *Tombstone* record into the index.
    ///
    /// Returns `true` if the key was present.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        self.map.shift_remove(key).is_some()
    }

    /// Removes every key, as if the journal had been cleared.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates live `(key, value)` pairs in insertion order (the order of
    /// each key's most recent assignment).
    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &Vec<u8>)> {
        self.map.iter()
    }

    /// Iterates live keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Vec<u8>> {
        self.map.keys()
    }
}

#[cfg(test)]
mod tests;
