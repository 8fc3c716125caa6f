//! # Lock — advisory cross-process file locking
//!
//! Wraps whole-file advisory locks (`flock(2)` on Unix, via the `fs2` crate)
//! and the `nlink`-based "has this handle's file been replaced out from
//! under me" check described in the engine's concurrency model.
//!
//! This crate owns no file handles itself — it only locks/unlocks handles
//! the caller already has open, and reports on their link count. The
//! reopen-on-`nlink == 0` dance (close the stale handle, reopen the path,
//! reparse the header, reset local state, retry) is the engine's
//! responsibility, since only the engine knows what "reset" means for a
//! journal reader or writer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lock::{ExclusiveGuard, SharedGuard};
//! use std::fs::File;
//!
//! let file = File::open("db.journal").unwrap();
//! {
//!     let _guard = SharedGuard::acquire(&file).unwrap();
//!     // read new bytes while holding the shared lock
//! }
//! {
//!     let _guard = ExclusiveGuard::acquire(&file).unwrap();
//!     // append while holding the exclusive lock
//! }
//! ```

use fs2::FileExt;
use std::fs::File;
use std::io;
use thiserror::Error;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Errors produced while acquiring or inspecting an advisory file lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// An underlying I/O error (including a failed lock/unlock syscall).
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A held shared (reader) advisory lock on a file handle.
///
/// The lock is released when this guard is dropped.
pub struct SharedGuard<'a> {
    file: &'a File,
}

impl<'a> SharedGuard<'a> {
    /// Blocks until a shared lock on `file` is granted.
    pub fn acquire(file: &'a File) -> Result<Self, LockError> {
        file.lock_shared()?;
        Ok(SharedGuard { file })
    }
}

impl Drop for SharedGuard<'_> {
    fn drop(&mut self) {
        // Best-effort: a failed unlock here would only matter if the
        // process kept running with a handle it believes is unlocked while
        // the OS disagrees, which we cannot recover from in a destructor.
        let _ = self.file.unlock();
    }
}

/// A held exclusive (writer/compactor) advisory lock on a file handle.
///
/// The lock is released when this guard is dropped.
pub struct ExclusiveGuard<'a> {
    file: &'a File,
}

impl<'a> ExclusiveGuard<'a> {
    /// Blocks until an exclusive lock on `file` is granted.
    pub fn acquire(file: &'a File) -> Result<Self, LockError> {
        file.lock_exclusive()?;
        Ok(ExclusiveGuard { file })
    }
}

impl Drop for ExclusiveGuard<'_> {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Returns `true` if `file`'s underlying inode has a link count of zero,
/// meaning the path it was opened from has since been replaced (e.g. by a
/// compaction rename) or unlinked. A held handle continues to be readable
/// and writable after this happens on Unix-like filesystems; this is
/// exactly the signal the engine uses to know it must close and reopen its
/// handle rather than keep operating on the orphaned inode.
#[cfg(unix)]
pub fn is_unlinked(file: &File) -> Result<bool, LockError> {
    let meta = file.metadata()?;
    Ok(meta.nlink() == 0)
}

/// Non-Unix fallback: link counts aren't a meaningful concept on platforms
/// without hardlink-based rename semantics, so this always reports the
/// handle as still live. Callers on such platforms rely on rename failing
/// instead.
#[cfg(not(unix))]
pub fn is_unlinked(_file: &File) -> Result<bool, LockError> {
    Ok(false)
}

#[cfg(test)]
mod tests;
