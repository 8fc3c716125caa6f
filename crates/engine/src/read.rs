//! Read path: `get`/`has`/`size`/`iterate`, and `update()` — the
//! incremental reader that folds journal bytes this handle hasn't seen yet
//! into the index, revalidating against a concurrent compaction rename.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use index::Index;
use journal::{Header, Record};
use serializer::Serializer;

use crate::{Database, DbError, Inner, State};

impl<T, S> Database<T, S>
where
    T: Send + Sync + 'static,
    S: Serializer<T> + 'static,
{
    /// Looks up `key` in the in-memory index. Does not consult the journal
    /// for bytes this handle has not read yet — call [`Self::sync`] first
    /// if another handle on the same path may have written since this one
    /// opened or last synced.
    ///
    /// If the key is absent and a default-value policy is configured, the
    /// default is installed (as if `set` had been called) and returned.
    pub fn get<K: Display + ?Sized>(&self, key: &K) -> Result<Option<T>, DbError>
    where
        T: Clone,
    {
        let key_bytes = self.inner.serializer.key_for(key)?;
        let guard = self.inner.state.lock().unwrap();
        if let Some(bytes) = guard.index.get(&key_bytes) {
            return Ok(Some(self.inner.serializer.decode(bytes)?));
        }
        drop(guard);

        match self.inner.default.resolve(&key.to_string()) {
            Some(default) => {
                self.set(key, default.clone())?;
                Ok(Some(default))
            }
            None => Ok(None),
        }
    }

    /// Returns `true` if `key` currently has a live value in the in-memory
    /// index.
    pub fn has<K: Display + ?Sized>(&self, key: &K) -> Result<bool, DbError> {
        let key_bytes = self.inner.serializer.key_for(key)?;
        Ok(self.inner.state.lock().unwrap().index.contains_key(&key_bytes))
    }

    /// Returns the number of live keys in the in-memory index.
    pub fn size(&self) -> usize {
        self.inner.state.lock().unwrap().index.len()
    }

    /// Returns the number of records folded by `update()`'s replay loop
    /// (at open time and on every subsequent `sync`/`lock`/`compact`).
    ///
    /// Records the writer's own back-read optimization skipped without
    /// re-decoding are not counted here; the in-memory index already
    /// reflects them directly (see the writer's `append_one`).
    pub fn logsize(&self) -> u64 {
        self.inner.state.lock().unwrap().logsize
    }

    /// Decodes every live entry in the in-memory index, in insertion order.
    pub fn iterate(&self) -> Result<Vec<(Vec<u8>, T)>, DbError> {
        let guard = self.inner.state.lock().unwrap();
        guard
            .index
            .iter()
            .map(|(k, v)| Ok((k.clone(), self.inner.serializer.decode(v)?)))
            .collect()
    }
}

/// Decodes every record in `buf` into `index`, returning the number of
/// records applied.
pub(crate) fn replay_into(index: &mut Index, buf: &[u8]) -> Result<u64, DbError> {
    let mut cursor = Cursor::new(buf);
    let len = buf.len() as u64;
    let mut applied = 0u64;
    while cursor.position() < len {
        match journal::decode(&mut cursor)? {
            Record::Put { key, value } => index.set(key, value),
            Record::Tombstone { key } => {
                index.delete(&key);
            }
        }
        applied += 1;
    }
    Ok(applied)
}

pub(crate) fn reopen_in(path: &Path, format_name: &str) -> Result<(File, u64), DbError> {
    let mut infile = File::open(path)?;
    let header = {
        let mut header_reader = BufReader::new(&mut infile);
        Header::read(&mut header_reader, format_name)?
    };
    Ok((infile, header.len() as u64))
}

/// Folds any journal bytes past `state.in_pos` into `state.index`.
///
/// Acquires a shared advisory lock around the read unless `hold_exclusive`
/// is `true` (the caller already holds the exclusive lock, e.g. inside
/// [`crate::Database::lock`] or during compaction, so a second lock on the
/// same file description would just be redundant work). If the handle's
/// underlying file has been replaced (a concurrent compaction rename),
/// reopens it, reparses the header, and restarts from a cleared index.
pub(crate) fn refresh_index<T, S: Serializer<T>>(
    inner: &Inner<T, S>,
    state: &mut State,
    hold_exclusive: bool,
) -> Result<(), DbError> {
    loop {
        let _shared = if hold_exclusive {
            None
        } else {
            Some(lock::SharedGuard::acquire(&state.infile)?)
        };

        if lock::is_unlinked(&state.infile)? {
            drop(_shared);
            let (infile, header_len) = reopen_in(&inner.path, inner.serializer.format_name())?;
            state.infile = infile;
            state.header_len = header_len;
            state.in_pos = header_len;
            state.index.clear();
            continue;
        }

        let size = state.infile.metadata()?.len();
        if size > state.in_pos {
            state.infile.seek(SeekFrom::Start(state.in_pos))?;
            let mut buf = vec![0u8; (size - state.in_pos) as usize];
            state.infile.read_exact(&mut buf)?;
            drop(_shared);
            let applied = replay_into(&mut state.index, &buf)?;
            state.logsize += applied;
            state.in_pos = size;
        }
        return Ok(());
    }
}
