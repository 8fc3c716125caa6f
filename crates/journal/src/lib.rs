//! # Journal — record codec and file header
//!
//! The on-disk format shared by every component that touches the journal
//! file: the file [`Header`] written once when a database is created, and
//! the per-mutation [`Record`] codec appended by every `set`/`delete`.
//!
//! This crate is deliberately I/O-agnostic. It knows how to turn a `Record`
//! into bytes and back, and how to read/write the file header, but it never
//! opens a file, never locks anything, and owns no handles — that is the
//! job of the `engine` crate's writer and reader components, which is why
//! the codec here only ever sees a `Read`/`Write` implementor (a real file,
//! a `Cursor<Vec<u8>>` in tests, or a bounded in-memory buffer).
//!
//! ## Record layout
//!
//! ```text
//! [key_size: u32 BE][value_size: u32 BE][key bytes][value bytes][crc32: u32 BE]
//! ```
//!
//! `value_size == DELETE_SENTINEL` marks a tombstone; no value bytes follow
//! and the CRC covers only the two size fields and the key. The CRC is the
//! IEEE CRC-32 (the same polynomial and algorithm `Zlib.crc32` uses) of
//! every byte that precedes it in the record.
//!
//! ## Header layout
//!
//! ```text
//! magic:        "DAYBREAK"  (8 bytes)
//! version:      u16 BE       (= 1)
//! format_len:   u16 BE
//! format_name:  UTF-8 bytes of length format_len
//! ```

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Magic bytes that open every journal file.
pub const MAGIC: &[u8; 8] = b"DAYBREAK";

/// The only header version this crate understands.
pub const VERSION: u16 = 1;

/// `value_size` sentinel marking a tombstone record.
pub const DELETE_SENTINEL: u32 = 0xFFFF_FFFF;

/// Errors produced while reading or writing the journal format.
#[derive(Debug, Error)]
pub enum JournalError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The first 8 bytes of the file are not `"DAYBREAK"`.
    #[error("wrong magic number in journal header")]
    WrongMagic,

    /// The header's version field does not match [`VERSION`].
    #[error("unsupported journal version {found} (expected {expected})")]
    WrongVersion {
        /// Version found in the header.
        found: u16,
        /// Version this crate supports.
        expected: u16,
    },

    /// The header's `format_name` does not match the caller's configured
    /// serializer.
    #[error("journal format mismatch: file uses {found:?}, database configured for {expected:?}")]
    WrongFormat {
        /// Format name found in the header.
        found: String,
        /// Format name the caller expected.
        expected: String,
    },

    /// A record's CRC did not match its payload.
    #[error("corrupt record: CRC mismatch")]
    MalformedRecord,

    /// A record was truncated partway through (a concurrent partial write,
    /// or a genuinely corrupt file).
    #[error("unexpected end of journal (truncated record)")]
    UnexpectedEnd,
}

fn map_eof(e: io::Error) -> JournalError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        JournalError::UnexpectedEnd
    } else {
        JournalError::Io(e)
    }
}

/// The file header every journal begins with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Format version (always [`VERSION`] for files this crate writes).
    pub version: u16,
    /// Name of the serializer that encoded the values in this file.
    pub format_name: String,
}

impl Header {
    /// Builds the header that should be written to a freshly created file.
    pub fn new(format_name: impl Into<String>) -> Self {
        Header {
            version: VERSION,
            format_name: format_name.into(),
        }
    }

    /// Serializes the header to the exact bytes written at the start of an
    /// empty file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let name = self.format_name.as_bytes();
        let mut buf = Vec::with_capacity(8 + 2 + 2 + name.len());
        buf.extend_from_slice(MAGIC);
        buf.write_u16::<BigEndian>(self.version).unwrap();
        buf.write_u16::<BigEndian>(name.len() as u16).unwrap();
        buf.extend_from_slice(name);
        buf
    }

    /// Total length in bytes of this header once serialized.
    pub fn len(&self) -> usize {
        8 + 2 + 2 + self.format_name.len()
    }

    /// Returns `true` if this header serializes to zero bytes. Never the
    /// case in practice (the magic alone is 8 bytes); kept for API symmetry
    /// with `len`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads and validates a header from `r`, checking its format name
    /// against `expected_format`.
    pub fn read<R: Read>(r: &mut R, expected_format: &str) -> Result<Header, JournalError> {
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic).map_err(map_eof)?;
        if &magic != MAGIC {
            return Err(JournalError::WrongMagic);
        }

        let version = r.read_u16::<BigEndian>().map_err(map_eof)?;
        if version != VERSION {
            return Err(JournalError::WrongVersion {
                found: version,
                expected: VERSION,
            });
        }

        let format_len = r.read_u16::<BigEndian>().map_err(map_eof)? as usize;
        let mut format_bytes = vec![0u8; format_len];
        r.read_exact(&mut format_bytes).map_err(map_eof)?;
        let format_name = String::from_utf8(format_bytes)
            .map_err(|_| JournalError::WrongFormat {
                found: "<non-utf8>".to_string(),
                expected: expected_format.to_string(),
            })?;

        if format_name != expected_format {
            return Err(JournalError::WrongFormat {
                found: format_name,
                expected: expected_format.to_string(),
            });
        }

        Ok(Header { version, format_name })
    }

    /// Writes the header to `w`.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<(), JournalError> {
        w.write_all(&self.to_bytes())?;
        Ok(())
    }
}

/// A single journal record: either a key-value insertion or a tombstone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A key-value insertion.
    Put {
        /// The lookup key.
        key: Vec<u8>,
        /// The encoded value bytes.
        value: Vec<u8>,
    },
    /// A tombstone marking `key` as deleted.
    Tombstone {
        /// The key to delete.
        key: Vec<u8>,
    },
}

impl Record {
    /// Returns the key this record pertains to, regardless of variant.
    pub fn key(&self) -> &[u8] {
        match self {
            Record::Put { key, .. } => key,
            Record::Tombstone { key } => key,
        }
    }
}

fn crc_over(key_size: u32, value_size: u32, key: &[u8], value: Option<&[u8]>) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(&key_size.to_be_bytes());
    hasher.update(&value_size.to_be_bytes());
    hasher.update(key);
    if let Some(v) = value {
        hasher.update(v);
    }
    hasher.finalize()
}

/// Serializes `record` into the exact on-disk layout described in the
/// module docs, including the trailing CRC.
pub fn encode(record: &Record) -> Vec<u8> {
    let (key, value) = match record {
        Record::Put { key, value } => (key.as_slice(), Some(value.as_slice())),
        Record::Tombstone { key } => (key.as_slice(), None),
    };

    let key_size = key.len() as u32;
    let value_size = value.map(|v| v.len() as u32).unwrap_or(DELETE_SENTINEL);
    let crc = crc_over(key_size, value_size, key, value);

    let mut buf = Vec::with_capacity(4 + 4 + key.len() + value.map(|v| v.len()).unwrap_or(0) + 4);
    buf.write_u32::<BigEndian>(key_size).unwrap();
    buf.write_u32::<BigEndian>(value_size).unwrap();
    buf.extend_from_slice(key);
    if let Some(v) = value {
        buf.extend_from_slice(v);
    }
    buf.write_u32::<BigEndian>(crc).unwrap();
    buf
}

/// Returns the number of bytes `encode(record)` would produce, without
/// allocating. Used by the writer's back-read optimization (§4.3) to tell
/// whether the file grew by exactly one record without re-reading it.
pub fn encoded_len(record: &Record) -> usize {
    let value_len = match record {
        Record::Put { value, .. } => value.len(),
        Record::Tombstone { .. } => 0,
    };
    4 + 4 + record.key().len() + value_len + 4
}

/// Consumes exactly one record from `r`, verifying its CRC.
///
/// Returns [`JournalError::UnexpectedEnd`] if `r` runs out of bytes partway
/// through a record (the caller is expected to only invoke this when it
/// knows at least one more record's worth of bytes should be available;
/// see the `engine` crate's reader for how the buffer boundary is enforced).
pub fn decode<R: Read>(r: &mut R) -> Result<Record, JournalError> {
    let key_size = r.read_u32::<BigEndian>().map_err(map_eof)?;
    let value_size = r.read_u32::<BigEndian>().map_err(map_eof)?;

    let mut key = vec![0u8; key_size as usize];
    r.read_exact(&mut key).map_err(map_eof)?;

    let is_tombstone = value_size == DELETE_SENTINEL;
    let value = if is_tombstone {
        None
    } else {
        let mut value = vec![0u8; value_size as usize];
        r.read_exact(&mut value).map_err(map_eof)?;
        Some(value)
    };

    let crc_expected = r.read_u32::<BigEndian>().map_err(map_eof)?;
    let crc_actual = crc_over(key_size, value_size, &key, value.as_deref());
    if crc_actual != crc_expected {
        return Err(JournalError::MalformedRecord);
    }

    Ok(match value {
        Some(value) => Record::Put { key, value },
        None => Record::Tombstone { key },
    })
}
