//! Write path: `set`/`delete`/the `_sync` variants, `flush`/`sync`/`lock`,
//! and the background writer thread itself.
//!
//! Every mutation updates the in-memory index *before* it is enqueued, so a
//! reader in this process observes its own writes immediately; the queued
//! [`Record`] is what the writer thread actually appends to the journal.

use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, MutexGuard};

use journal::Record;
use lock::ExclusiveGuard;
use serializer::Serializer;

use crate::{read, Database, DbError, Inner, State};

impl<T, S> Database<T, S>
where
    T: Send + Sync + 'static,
    S: Serializer<T> + 'static,
{
    /// Inserts or overwrites `key`, returning once the mutation has been
    /// applied to the in-memory index and queued for the writer thread.
    /// Does not wait for the record to reach disk; use [`Self::set_sync`]
    /// for that.
    pub fn set<K: Display + ?Sized>(&self, key: &K, value: T) -> Result<(), DbError> {
        let key_bytes = self.inner.serializer.key_for(key)?;
        let value_bytes = self.inner.serializer.encode(&value)?;
        let mut guard = self.inner.state.lock().unwrap();
        ensure_open(&guard)?;
        guard.index.set(key_bytes.clone(), value_bytes.clone());
        guard.queue.push_back(Some(Record::Put {
            key: key_bytes,
            value: value_bytes,
        }));
        self.inner.not_empty.notify_one();
        Ok(())
    }

    /// Like [`Self::set`], but blocks until the record has been written and
    /// fsynced by the writer thread.
    pub fn set_sync<K: Display + ?Sized>(&self, key: &K, value: T) -> Result<(), DbError> {
        self.set(key, value)?;
        self.flush()
    }

    /// Deletes `key`, returning once the tombstone has been applied to the
    /// in-memory index and queued. Does not wait for the tombstone to reach
    /// disk; use [`Self::delete_sync`] for that.
    pub fn delete<K: Display + ?Sized>(&self, key: &K) -> Result<(), DbError> {
        let key_bytes = self.inner.serializer.key_for(key)?;
        let mut guard = self.inner.state.lock().unwrap();
        ensure_open(&guard)?;
        guard.index.delete(&key_bytes);
        guard
            .queue
            .push_back(Some(Record::Tombstone { key: key_bytes }));
        self.inner.not_empty.notify_one();
        Ok(())
    }

    /// Like [`Self::delete`], but blocks until the tombstone has been
    /// written and fsynced by the writer thread.
    pub fn delete_sync<K: Display + ?Sized>(&self, key: &K) -> Result<(), DbError> {
        self.delete(key)?;
        self.flush()
    }

    /// Blocks until the writer queue has fully drained. Surfaces a prior
    /// background write failure, if any, as [`DbError::WriterFailed`].
    pub fn flush(&self) -> Result<(), DbError> {
        let mut guard = self.inner.state.lock().unwrap();
        guard = wait_for_drain(&self.inner, guard);
        check_writer_failure(&mut guard)
    }

    /// Like [`Self::flush`], but additionally folds any journal bytes this
    /// handle has not yet read into the in-memory index (useful after
    /// another handle on the same path has written, see
    /// [`read::refresh_index`]).
    pub fn sync(&self) -> Result<(), DbError> {
        let mut guard = self.inner.state.lock().unwrap();
        guard = wait_for_drain(&self.inner, guard);
        check_writer_failure(&mut guard)?;
        read::refresh_index(&self.inner, &mut guard, false)
    }

    /// Runs `f` with the database's exclusive cross-process lock held: the
    /// writer queue is flushed, the index is brought fully up to date, `f`
    /// runs, and the queue is flushed again before the lock is released.
    pub fn lock<R>(&self, f: impl FnOnce(&Self) -> R) -> Result<R, DbError> {
        let dup = {
            let mut guard = self.inner.state.lock().unwrap();
            guard = wait_for_drain(&self.inner, guard);
            check_writer_failure(&mut guard)?;
            guard.out.try_clone()?
        };
        let _exclusive = ExclusiveGuard::acquire(&dup)?;
        {
            let mut guard = self.inner.state.lock().unwrap();
            read::refresh_index(&self.inner, &mut guard, true)?;
        }

        let result = f(self);

        {
            let mut guard = self.inner.state.lock().unwrap();
            guard = wait_for_drain(&self.inner, guard);
            check_writer_failure(&mut guard)?;
        }
        Ok(result)
    }
}

pub(crate) fn ensure_open(state: &State) -> Result<(), DbError> {
    if state.closed {
        Err(DbError::ClosedDatabase)
    } else {
        Ok(())
    }
}

/// Waits on the "queue empty" condvar until the writer has drained its
/// queue. Reacquires `guard`'s mutex on each wakeup per `Condvar::wait`.
pub(crate) fn wait_for_drain<'a, T, S: Serializer<T>>(
    inner: &'a Inner<T, S>,
    mut guard: MutexGuard<'a, State>,
) -> MutexGuard<'a, State> {
    while !guard.queue.is_empty() {
        guard = inner.empty.wait(guard).unwrap();
    }
    guard
}

/// Takes and clears any latched writer failure, surfacing it once to the
/// caller that observes it.
pub(crate) fn check_writer_failure(state: &mut State) -> Result<(), DbError> {
    match state.writer_failure.take() {
        Some(msg) => Err(DbError::WriterFailed(msg)),
        None => Ok(()),
    }
}

/// Signals the writer thread to flush and exit, then joins it. Surfaces any
/// failure the writer recorded while draining the final queue.
pub(crate) fn close_inner<T, S: Serializer<T>>(inner: &Inner<T, S>) -> Result<(), DbError> {
    {
        let mut guard = inner.state.lock().unwrap();
        if guard.closed {
            return Err(DbError::ClosedDatabase);
        }
        guard.closed = true;
        guard.queue.push_back(None);
        inner.not_empty.notify_one();
    }
    if let Some(handle) = inner.writer_thread.lock().unwrap().take() {
        let _ = handle.join();
    }
    let mut guard = inner.state.lock().unwrap();
    check_writer_failure(&mut guard)
}

pub(crate) fn reopen_out(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Appends one record to `state.out`, holding the exclusive advisory lock
/// for the duration and revalidating the handle against a concurrent
/// compaction rename first.
fn append_one(state: &mut State, path: &Path, record: &Record) -> Result<(), DbError> {
    loop {
        let guard = ExclusiveGuard::acquire(&state.out)?;
        if lock::is_unlinked(&state.out)? {
            drop(guard);
            state.out = reopen_out(path)?;
            continue;
        }

        let bytes = journal::encode(record);
        state.out.write_all(&bytes)?;
        state.out.sync_all()?;

        let new_size = state.out.metadata()?.len();
        if new_size == state.in_pos + bytes.len() as u64 {
            state.in_pos += bytes.len() as u64;
        }
        return Ok(());
    }
}

/// The background writer thread body: pops one record at a time off the
/// queue and appends it, until it pops the `None` shutdown sentinel queued
/// by [`close_inner`].
///
/// The item at the front of the queue is only removed *after* it has been
/// appended (and fsynced, for a real record): the state mutex is held
/// continuously from the moment the queue is seen non-empty through the
/// append, so a `wait_for_drain` caller can never observe `queue.is_empty()`
/// while the front record has not actually reached disk yet.
pub(crate) fn writer_loop<T, S>(inner: Arc<Inner<T, S>>)
where
    S: Serializer<T>,
{
    loop {
        let mut guard = inner.state.lock().unwrap();
        loop {
            if !guard.queue.is_empty() {
                break;
            }
            guard = inner.not_empty.wait(guard).unwrap();
        }

        let item = guard.queue.front().cloned().unwrap();
        match item {
            None => {
                let _ = guard.out.sync_all();
                guard.queue.pop_front();
                inner.empty.notify_all();
                return;
            }
            Some(record) => {
                if let Err(e) = append_one(&mut guard, &inner.path, &record) {
                    tracing::error!(
                        path = %inner.path.display(),
                        key = %String::from_utf8_lossy(record.key()),
                        error = %e,
                        "background writer failed to append record",
                    );
                    guard.writer_failure = Some(e.to_string());
                }
                guard.queue.pop_front();
                if guard.queue.is_empty() {
                    inner.empty.notify_all();
                }
            }
        }
    }
}
