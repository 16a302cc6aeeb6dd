//! Cross-crate integration test helpers.
//!
//! Provides a harness that mirrors every save and delete into an expected
//! state and checks the store's keys against it.

use crate::fixtures::TestModel;
use keydex_codec::{to_fields, Fields};
use keydex_core::{field_value, CoreResult, Index, ModelOptions};
use keydex_storage::KeyValueStore;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A test harness for integration testing.
pub struct IntegrationHarness {
    /// The model under test and its store.
    pub model: TestModel,
    /// Expected live records by identity.
    expected: BTreeMap<String, Fields>,
}

impl IntegrationHarness {
    /// Creates a harness over a fresh in-memory model.
    pub fn new(namespace: &str, indexes: Vec<Index>) -> Self {
        Self::with_options(namespace, indexes, ModelOptions::default())
    }

    /// Creates a harness with the given options.
    pub fn with_options(namespace: &str, indexes: Vec<Index>, options: ModelOptions) -> Self {
        Self {
            model: TestModel::with_options(namespace, indexes, options),
            expected: BTreeMap::new(),
        }
    }

    /// Saves a record and tracks it when the save succeeds.
    pub fn save<T: Serialize>(&mut self, record: &T) -> CoreResult<()> {
        self.model.save(record)?;
        let fields = to_fields(record)?;
        let id = self.identity_of(&fields);
        self.expected.insert(id, fields);
        Ok(())
    }

    /// Deletes a record by identity and stops tracking it when the delete
    /// succeeds.
    pub fn delete(&mut self, id: &str) -> CoreResult<()> {
        self.model.delete(&self.model.id_query(id))?;
        self.expected.remove(id);
        Ok(())
    }

    /// Returns true if a record with this identity is tracked.
    pub fn contains(&self, id: &str) -> bool {
        self.expected.contains_key(id)
    }

    /// Returns the count of tracked records.
    pub fn tracked_count(&self) -> usize {
        self.expected.len()
    }

    /// Verifies the store holds exactly one key per tracked record and
    /// index, each holding that record, and nothing else.
    ///
    /// # Panics
    ///
    /// Panics on the first mismatch.
    pub fn verify_keys(&self) {
        let format = self.model.options().record_format;
        let mut expected_keys = BTreeSet::new();

        for (id, fields) in &self.expected {
            let id_value = field_value(fields, self.model.options().id_field_name())
                .expect("tracked record has an identity");
            for index in self.model.indexes() {
                let key = self
                    .model
                    .model
                    .keys()
                    .record_key(index, fields, &id_value)
                    .expect("tracked record is encodable");

                let stored = self
                    .model
                    .store
                    .read(&key, false)
                    .expect("store read failed");
                assert_eq!(stored.len(), 1, "missing key {key} for record {id}");
                let stored: Fields = format
                    .decode_fields(&stored[0].value)
                    .expect("stored blob decodes");
                assert_eq!(&stored, fields, "stale blob under {key}");

                expected_keys.insert(key);
            }
        }

        let actual: BTreeSet<String> = self.model.stored_keys().into_iter().collect();
        let orphans: Vec<_> = actual.difference(&expected_keys).collect();
        assert!(orphans.is_empty(), "orphaned keys: {orphans:?}");
    }

    fn identity_of(&self, fields: &Fields) -> String {
        field_value(fields, self.model.options().id_field_name())
            .map(|v| v.to_string())
            .expect("saved record has an identity")
    }
}
