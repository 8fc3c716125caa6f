//! # Serializer — the pluggable value codec
//!
//! The database treats values as opaque: it only ever sees the bytes a
//! [`Serializer`] produces. This crate specifies that contract and ships
//! one default implementation, [`BincodeSerializer`], built on `serde` +
//! `bincode` — a host-portable structural encoding, the same pairing
//! reached for elsewhere in this ecosystem when a type just needs to
//! become bytes and back.
//!
//! The active serializer's [`Serializer::format_name`] is written into the
//! journal's file header (see the `journal` crate) so that re-opening a
//! database file with a different serializer fails fast with a format
//! mismatch instead of silently decoding garbage.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::marker::PhantomData;
use thiserror::Error;

/// Errors produced while encoding, decoding, or deriving a key.
#[derive(Debug, Error)]
pub enum SerializerError {
    /// The value could not be encoded to bytes.
    #[error("failed to encode value: {0}")]
    Encode(String),

    /// The stored bytes could not be decoded back into a value.
    #[error("failed to decode value: {0}")]
    Decode(String),

    /// `key_for` produced an empty byte string; keys must be non-empty.
    #[error("key must not be empty")]
    EmptyKey,
}

/// The contract between the database and the value type it stores.
///
/// Implementations provide `encode`/`decode` for the value type `T`, and
/// `key_for` to reduce an arbitrary user key to the canonical non-empty
/// byte string the index and journal actually operate on (typically
/// stringification, via `Display`).
pub trait Serializer<T>: Send + Sync {
    /// Encodes `value` into the bytes persisted in a *Put* record.
    fn encode(&self, value: &T) -> Result<Vec<u8>, SerializerError>;

    /// Decodes bytes previously produced by [`Serializer::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<T, SerializerError>;

    /// Reduces a user-supplied key to its canonical byte-string form.
    ///
    /// The default stringifies via `Display`. Returns
    /// [`SerializerError::EmptyKey`] if that produces an empty string,
    /// since the journal format and the index both require non-empty
    /// keys.
    fn key_for<K: Display + ?Sized>(&self, key: &K) -> Result<Vec<u8>, SerializerError> {
        let s = key.to_string();
        if s.is_empty() {
            return Err(SerializerError::EmptyKey);
        }
        Ok(s.into_bytes())
    }

    /// A short, stable name identifying this serializer, written into the
    /// journal's file header and checked on every open.
    fn format_name(&self) -> &'static str;
}

/// Default [`Serializer`] built on `serde` + `bincode`.
pub struct BincodeSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeSerializer<T> {
    /// Creates a new bincode-backed serializer for `T`.
    pub fn new() -> Self {
        BincodeSerializer {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

// `BincodeSerializer<T>` holds no data of its own (just a zero-sized
// phantom marker), so it is `Send`/`Sync` regardless of `T`.
unsafe impl<T> Send for BincodeSerializer<T> {}
unsafe impl<T> Sync for BincodeSerializer<T> {}

impl<T> Serializer<T> for BincodeSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> Result<Vec<u8>, SerializerError> {
        bincode::serialize(value).map_err(|e| SerializerError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, SerializerError> {
        bincode::deserialize(bytes).map_err(|e| SerializerError::Decode(e.to_string()))
    }

    fn format_name(&self) -> &'static str {
        "bincode/1"
    }
}

#[cfg(test)]
mod tests;
