//! Key-value store trait definition.

use crate::error::StorageResult;

/// A single key/blob pair returned by [`KeyValueStore::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The full store key.
    pub key: String,
    /// The stored blob.
    pub value: Vec<u8>,
}

impl Record {
    /// Creates a new record.
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An ordered key-value store.
///
/// Stores are **opaque**: they never look inside keys or values. The index
/// layer relies only on the ordering guarantee of prefix scans to turn
/// encoded keys into sorted result sets.
///
/// # Invariants
///
/// - `write` overwrites any existing value under the same key
/// - `read` with `prefix = false` returns at most one record
/// - `read` with `prefix = true` returns every record whose key starts with
///   `key`, sorted ascending by the key's bytes
/// - `delete` of a missing key succeeds
/// - Stores must be `Send + Sync` so they can be shared across models
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
pub trait KeyValueStore: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the write fails.
    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Reads the record stored under `key`, or every record whose key starts
    /// with `key` when `prefix` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the read fails.
    fn read(&self, key: &str, prefix: bool) -> StorageResult<Vec<Record>>;

    /// Deletes the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the delete fails.
    fn delete(&self, key: &str) -> StorageResult<()>;
}
