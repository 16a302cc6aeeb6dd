//! In-memory key-value store for testing.

use crate::error::{StorageError, StorageResult};
use crate::store::{KeyValueStore, Record};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

/// An in-memory ordered key-value store.
///
/// This store keeps all records in a `BTreeMap` and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral models that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use keydex_storage::{InMemoryStore, KeyValueStore};
///
/// let store = InMemoryStore::new();
/// store.write("a:1", b"one").unwrap();
/// store.write("a:2", b"two").unwrap();
/// store.write("b:1", b"three").unwrap();
/// assert_eq!(store.read("a:", true).unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct InMemoryStore {
    data: RwLock<Option<BTreeMap<String, Vec<u8>>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            data: RwLock::new(Some(BTreeMap::new())),
        }
    }
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().as_ref().map_or(0, BTreeMap::len)
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns every key in ascending order.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data
            .read()
            .as_ref()
            .map(|data| data.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Removes all records.
    pub fn clear(&self) {
        if let Some(data) = self.data.write().as_mut() {
            data.clear();
        }
    }

    /// Closes the store. Every later operation fails with [`StorageError::Closed`].
    pub fn close(&self) {
        *self.data.write() = None;
    }
}

impl KeyValueStore for InMemoryStore {
    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let mut guard = self.data.write();
        let data = guard.as_mut().ok_or(StorageError::Closed)?;
        data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn read(&self, key: &str, prefix: bool) -> StorageResult<Vec<Record>> {
        let guard = self.data.read();
        let data = guard.as_ref().ok_or(StorageError::Closed)?;

        if !prefix {
            return Ok(data
                .get(key)
                .map(|value| vec![Record::new(key, value.clone())])
                .unwrap_or_default());
        }

        Ok(data
            .range::<str, _>((Bound::Included(key), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(key))
            .map(|(k, v)| Record::new(k.clone(), v.clone()))
            .collect())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut guard = self.data.write();
        let data = guard.as_mut().ok_or(StorageError::Closed)?;
        data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn memory_new_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn memory_write_then_exact_read() {
        let store = InMemoryStore::new();
        store.write("k", b"v").unwrap();

        let records = store.read("k", false).unwrap();
        assert_eq!(records, vec![Record::new("k", b"v".to_vec())]);
    }

    #[test]
    fn memory_exact_read_ignores_longer_keys() {
        let store = InMemoryStore::new();
        store.write("k1", b"v").unwrap();

        assert!(store.read("k", false).unwrap().is_empty());
    }

    #[test]
    fn memory_write_overwrites() {
        let store = InMemoryStore::new();
        store.write("k", b"old").unwrap();
        store.write("k", b"new").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.read("k", false).unwrap()[0].value, b"new");
    }

    #[test]
    fn memory_prefix_scan_is_ordered_and_bounded() {
        let store = InMemoryStore::new();
        store.write("a:3", b"3").unwrap();
        store.write("a:1", b"1").unwrap();
        store.write("b:0", b"x").unwrap();
        store.write("a:2", b"2").unwrap();
        store.write("0", b"y").unwrap();

        let keys: Vec<_> = store
            .read("a:", true)
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["a:1", "a:2", "a:3"]);
    }

    #[test]
    fn memory_empty_prefix_scans_everything() {
        let store = InMemoryStore::new();
        store.write("b", b"").unwrap();
        store.write("a", b"").unwrap();

        assert_eq!(store.read("", true).unwrap().len(), 2);
    }

    #[test]
    fn memory_delete_missing_key_succeeds() {
        let store = InMemoryStore::new();
        assert!(store.delete("nope").is_ok());
    }

    #[test]
    fn memory_delete_removes_key() {
        let store = InMemoryStore::new();
        store.write("k", b"v").unwrap();
        store.delete("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn memory_clear() {
        let store = InMemoryStore::new();
        store.write("k", b"v").unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn memory_closed_store_fails() {
        let store = InMemoryStore::new();
        store.close();

        assert!(matches!(store.write("k", b"v"), Err(StorageError::Closed)));
        assert!(matches!(store.read("k", true), Err(StorageError::Closed)));
        assert!(matches!(store.delete("k"), Err(StorageError::Closed)));
    }

    proptest! {
        #[test]
        fn prefix_scan_matches_filter(
            keys in prop::collection::btree_set("[a-c]{1,4}", 0..40),
            prefix in "[a-c]{0,2}",
        ) {
            let store = InMemoryStore::new();
            for key in &keys {
                store.write(key, key.as_bytes()).unwrap();
            }

            let scanned: Vec<String> = store
                .read(&prefix, true)
                .unwrap()
                .into_iter()
                .map(|r| r.key)
                .collect();
            let expected: Vec<String> = keys
                .iter()
                .filter(|k| k.starts_with(&prefix))
                .cloned()
                .collect();
            prop_assert_eq!(scanned, expected);
        }
    }
}
