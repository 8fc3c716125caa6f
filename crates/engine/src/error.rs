//! The facade's caller-facing error type, composing every lower crate's
//! error via `#[from]` so `?` reads the same way across the workspace.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a [`crate::Database`] operation can fail with.
#[derive(Debug, Error)]
pub enum DbError {
    /// An underlying I/O error not otherwise classified below.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `create_if_missing` was `false` and the journal file did not exist.
    #[error("database file missing: {}", .0.display())]
    FileMissing(PathBuf),

    /// A journal header or record failed to parse or validate.
    #[error(transparent)]
    Journal(#[from] journal::JournalError),

    /// An advisory lock could not be acquired or inspected.
    #[error(transparent)]
    Lock(#[from] lock::LockError),

    /// The configured value serializer failed to encode or decode.
    #[error(transparent)]
    Serializer(#[from] serializer::SerializerError),

    /// The database has already been closed.
    #[error("operation attempted on a closed database")]
    ClosedDatabase,

    /// The background writer dropped one or more records after a prior
    /// I/O failure (see the module docs on worker recovery). Surfaced once
    /// to the next synchronous caller, then cleared.
    #[error("background writer failed: {0}")]
    WriterFailed(String),
}
