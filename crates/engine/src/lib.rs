//! # Engine — the embedded key-value store facade
//!
//! Ties together the [`journal`] (record codec + file header), [`index`]
//! (in-memory mirror), [`lock`] (advisory cross-process locking), and
//! [`serializer`] (pluggable value codec) crates into a single append-only,
//! single-file key-value store: [`Database`].
//!
//! ## Architecture
//!
//! ```text
//! Caller
//!   |
//!   v
//! ┌──────────────────────────────────────────────────────┐
//! │                      DATABASE                        │
//! │                                                       │
//! │ write.rs → index.set/delete → enqueue Record          │
//! │                                     |                 │
//! │                                     v                 │
//! │                          background writer thread     │
//! │                          (exclusive lock, append,     │
//! │                           fsync, back-read opt.)      │
//! │                                                       │
//! │ read.rs  → index lookup, refreshed from the journal   │
//! │            tail the writer hasn't folded in yet       │
//! │                                                       │
//! │ compaction.rs → dump index to temp file, copy any     │
//! │                 concurrent tail, atomic rename        │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module        | Purpose                                                       |
//! |---------------|----------------------------------------------------------------|
//! | `lib.rs`      | `Database` struct, `open`, `close`, `Drop`                      |
//! | `recovery`    | Opening a path: header read/write, full-journal replay          |
//! | `write`       | `set`/`delete`/`*_sync`/`flush`/`sync`/`lock`, the writer thread |
//! | `read`        | `get`/`has`/`size`/`iterate` and the incremental `update()`     |
//! | `compaction`  | `compact()`/`clear()`                                           |
//! | `registry`    | Process-wide open-database tracking, exit-time cleanup          |
//!
//! ## Crash Safety
//!
//! Every mutation updates the in-memory index before it is even enqueued for
//! the background writer, so a reader in this process always sees its own
//! writes immediately. The on-disk journal only reflects a mutation once the
//! writer thread has appended and fsynced its record; `sync`/`set_sync`/
//! `delete_sync` block until the queue has drained to give the caller that
//! guarantee explicitly. See [`DbError::WriterFailed`] for how a background
//! write failure is surfaced.

mod compaction;
mod enumerate;
mod error;
mod read;
mod recovery;
mod registry;
mod write;

pub use enumerate::matches_snapshot;

#[cfg(test)]
mod tests;

use config::{DefaultValue, OpenOptions};
pub use error::DbError;
use index::Index;
use journal::Record;
pub use registry::shutdown_all;
use serializer::{BincodeSerializer, Serializer};
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// Mutable state shared between the facade and the background writer
/// thread, all guarded by a single mutex: it protects the queue, the
/// index, and the replay/compaction critical sections alike.
pub(crate) struct State {
    pub(crate) index: Index,
    pub(crate) queue: VecDeque<Option<Record>>,
    pub(crate) out: File,
    pub(crate) infile: File,
    pub(crate) in_pos: u64,
    pub(crate) header_len: u64,
    pub(crate) logsize: u64,
    pub(crate) closed: bool,
    pub(crate) writer_failure: Option<String>,
}

pub(crate) struct Inner<T, S: Serializer<T>> {
    pub(crate) state: Mutex<State>,
    /// Signaled whenever a record is pushed so the writer thread wakes up.
    pub(crate) not_empty: Condvar,
    /// Signaled whenever the queue drains to empty so `sync`/`flush`/`lock`
    /// callers waiting on a quiescent writer wake up.
    pub(crate) empty: Condvar,
    pub(crate) serializer: S,
    pub(crate) path: PathBuf,
    pub(crate) default: DefaultValue<T>,
    pub(crate) writer_thread: Mutex<Option<JoinHandle<()>>>,
}

impl<T, S> registry::RegisteredDatabase for Inner<T, S>
where
    T: Send + Sync + 'static,
    S: Serializer<T> + 'static,
{
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn close_for_shutdown(&self) {
        if let Err(e) = crate::write::close_inner(self) {
            tracing::error!(path = %self.path.display(), error = %e, "error while closing database at process exit");
        }
    }
}

/// An open, embedded, append-only key-value store backed by a single
/// journal file.
///
/// `T` is the value type; `S` is the [`Serializer`] used to turn `T` into
/// bytes and back (`BincodeSerializer<T>` by default). Keys are whatever
/// implements `Display`, reduced to a canonical byte string by
/// `S::key_for`.
///
/// Every method takes `&self`; concurrent callers are meant to share one
/// handle (e.g. behind an `Arc`) rather than open the path twice.
pub struct Database<T, S: Serializer<T> = BincodeSerializer<T>> {
    inner: Arc<Inner<T, S>>,
}

impl<T> Database<T, BincodeSerializer<T>>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync + 'static,
{
    /// Opens (or creates) a database at `path` using the default
    /// bincode-backed serializer and default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        Self::open_with(path, BincodeSerializer::new(), OpenOptions::new())
    }

    /// Opens (or creates) a database at `path` using the default
    /// bincode-backed serializer and the given options.
    pub fn open_with_options(
        path: impl AsRef<Path>,
        options: OpenOptions<T>,
    ) -> Result<Self, DbError> {
        Self::open_with(path, BincodeSerializer::new(), options)
    }
}

impl<T, S> Database<T, S>
where
    T: Send + Sync + 'static,
    S: Serializer<T> + 'static,
{
    /// Opens (or creates) a database at `path` with an explicit serializer
    /// and options.
    pub fn open_with(
        path: impl AsRef<Path>,
        serializer: S,
        options: OpenOptions<T>,
    ) -> Result<Self, DbError> {
        recovery::open(path.as_ref(), serializer, options)
    }

    /// Returns the path this database was opened from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Closes the database: signals the writer thread to flush and exit,
    /// joins it, and removes this handle from the process-wide registry.
    ///
    /// Calling it twice is safe but not a silent no-op: the second call
    /// reports [`DbError::ClosedDatabase`] so callers can tell a
    /// double-close apart from a first close that had nothing to flush.
    pub fn close(&self) -> Result<(), DbError> {
        let result = write::close_inner(&self.inner);
        let erased: Arc<dyn registry::RegisteredDatabase> = self.inner.clone();
        registry::unregister(&erased);
        result
    }
}

impl<T, S: Serializer<T>> Drop for Database<T, S> {
    fn drop(&mut self) {
        // Best-effort: a scope-exit close that fails (e.g. because the
        // handle was already closed explicitly) is not actionable from a
        // destructor. The registry's exit-time sweep is the backstop for
        // anything this misses.
        if !self.inner.state.lock().unwrap().closed {
            let _ = write::close_inner(&self.inner);
        }
    }
}
