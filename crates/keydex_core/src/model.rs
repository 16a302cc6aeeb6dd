//! Indexed model over a key-value store.

use crate::config::ModelOptions;
use crate::error::{CoreError, CoreResult};
use crate::index::Index;
use crate::keys::{field_value, KeyBuilder};
use crate::query::Query;
use keydex_codec::{to_fields, FieldValue, Fields};
use keydex_storage::{KeyValueStore, Record};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

/// A place records are saved to and queried from.
///
/// Every record is stored once per index: under each declared index and
/// under the identity index, which is appended last. Each copy holds the
/// full serialized record, so any index can answer a query without a second
/// lookup.
///
/// # Consistency
///
/// The underlying store offers no transactions. A failure part way through
/// [`Model::save`] or [`Model::delete`] leaves some keys updated and others
/// stale; nothing is rolled back. Saves and deletes issued through the same
/// `Model` are serialized, so concurrent callers sharing it cannot interleave
/// their stale-key cleanup or uniqueness checks. Separate `Model` instances
/// over the same namespace are not coordinated.
///
/// # Example
///
/// ```rust
/// use keydex_core::{Index, Model, ModelOptions, Query};
/// use keydex_storage::InMemoryStore;
/// use serde::{Deserialize, Serialize};
/// use std::sync::Arc;
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct User {
///     id: String,
///     age: i64,
/// }
///
/// let model = Model::new(
///     Arc::new(InMemoryStore::new()),
///     "users",
///     vec![Index::by_equality("age")],
///     ModelOptions::default(),
/// );
///
/// model.save(&User { id: "1".into(), age: 30 }).unwrap();
/// model.save(&User { id: "2".into(), age: 5 }).unwrap();
///
/// let by_age: Vec<User> = model.list(&Query::all("age")).unwrap();
/// assert_eq!(by_age[0].id, "2");
///
/// let one: User = model.read(&model.id_query("1")).unwrap();
/// assert_eq!(one.age, 30);
///
/// model.delete(&model.id_query("1")).unwrap();
/// ```
pub struct Model {
    store: Arc<dyn KeyValueStore>,
    keys: KeyBuilder,
    /// Declared indexes followed by the identity index.
    indexes: Vec<Index>,
    options: ModelOptions,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("namespace", &self.keys.namespace())
            .field("indexes", &self.indexes)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Creates a model over `store`.
    ///
    /// `namespace` separates this model's keys from other models sharing
    /// the same store.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        namespace: impl Into<String>,
        indexes: Vec<Index>,
        options: ModelOptions,
    ) -> Self {
        let mut indexes = indexes;
        indexes.push(options.id_index.clone());
        Self {
            store,
            keys: KeyBuilder::new(namespace),
            indexes,
            options,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        self.keys.namespace()
    }

    /// Returns every maintained index, the identity index last.
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Returns the options.
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Returns the key builder.
    pub fn keys(&self) -> &KeyBuilder {
        &self.keys
    }

    fn id_index(&self) -> &Index {
        &self.options.id_index
    }

    /// Builds an identity lookup for `id`, the only query shape
    /// [`Model::delete`] accepts.
    pub fn id_query(&self, id: impl Into<FieldValue>) -> Query {
        self.id_index().query(id)
    }

    fn declared_indexes(&self) -> &[Index] {
        &self.indexes[..self.indexes.len() - 1]
    }

    /// Returns the first index with the shape of `query`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoMatchingIndex`] if no index matches.
    pub fn resolve(&self, query: &Query) -> CoreResult<&Index> {
        let index = self
            .indexes
            .iter()
            .find(|index| index.matches(query))
            .ok_or_else(|| CoreError::no_matching_index(&query.field_name, query.kind.to_string()))?;
        trace!(
            field = %query.field_name,
            order = %query.order.order_type,
            index = %index.prefix(),
            "resolved index"
        );
        Ok(index)
    }

    fn scan(&self, query: &Query) -> CoreResult<Vec<Record>> {
        self.scan_index(self.resolve(query)?, query)
    }

    /// Scans `index` for `query`, keeping only records whose filter field
    /// equals the query value.
    ///
    /// Raw key segments may themselves contain `:`, so the scan prefix for
    /// `a` also reaches keys written for `a:0`.
    fn scan_index(&self, index: &Index, query: &Query) -> CoreResult<Vec<Record>> {
        let key = self.keys.scan_key(index, query)?;
        if self.options.debug {
            debug!(namespace = %self.namespace(), key = %key, "listing key");
        }
        let records = self.store.read(&key, true)?;
        let Some(value) = &query.value else {
            return Ok(records);
        };

        let mut matching = Vec::with_capacity(records.len());
        for record in records {
            if self.holds(&record, &index.field_name, value)? {
                matching.push(record);
            } else {
                trace!(key = %record.key, "skipping longer value under scan prefix");
            }
        }
        Ok(matching)
    }

    fn holds(&self, record: &Record, field: &str, value: &FieldValue) -> CoreResult<bool> {
        let fields = self.options.record_format.decode_fields(&record.value)?;
        Ok(field_value(&fields, field).ok().as_ref() == Some(value))
    }

    /// Extracts the identity of a record.
    fn identity(&self, fields: &Fields) -> CoreResult<FieldValue> {
        let field = self.options.id_field_name();
        let id = fields
            .get(field)
            .and_then(|raw| FieldValue::from_json(raw).ok())
            .ok_or_else(|| CoreError::missing_identity(field))?;
        if matches!(&id, FieldValue::Text(s) if s.is_empty()) {
            return Err(CoreError::missing_identity(field));
        }
        Ok(id)
    }

    fn find_by_id(&self, id: &FieldValue) -> CoreResult<Option<Fields>> {
        let query = self.id_query(id.clone());
        match self.scan_index(self.id_index(), &query)?.first() {
            Some(record) => Ok(Some(self.options.record_format.decode_fields(&record.value)?)),
            None => Ok(None),
        }
    }

    /// Saves `record`, maintaining every index.
    ///
    /// Index keys derived from the previous version of the record are
    /// removed when the values they were built from change. Unique indexes
    /// are checked before anything is written.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingIdentity`] if the identity field is absent or empty
    /// - [`CoreError::UniqueConstraintViolation`] if a unique value belongs to
    ///   another record
    /// - [`CoreError::UnsupportedEncoding`] if an indexed field has no key encoding
    /// - [`CoreError::Storage`] / [`CoreError::Codec`] on store or serialization failure
    pub fn save<T: Serialize + ?Sized>(&self, record: &T) -> CoreResult<()> {
        let fields = to_fields(record)?;
        let id = self.identity(&fields)?;
        let blob = self.options.record_format.encode(record)?;

        let new_keys = self
            .indexes
            .iter()
            .map(|index| self.keys.record_key(index, &fields, &id))
            .collect::<CoreResult<Vec<_>>>()?;

        let _guard = self.write_lock.lock();

        let previous = self.find_by_id(&id)?;

        for index in self.declared_indexes().iter().filter(|index| index.unique) {
            let value = field_value(&fields, &index.field_name)?;
            for existing in self.scan_index(index, &index.query(value))? {
                let existing = self.options.record_format.decode_fields(&existing.value)?;
                if self.identity(&existing).ok().as_ref() != Some(&id) {
                    return Err(CoreError::unique_violation(&index.field_name));
                }
            }
        }

        let identity_position = self.indexes.len() - 1;
        for (position, (index, key)) in self.indexes.iter().zip(&new_keys).enumerate() {
            if position != identity_position {
                if let Some(previous) = &previous {
                    // A previous version that could not be keyed was never indexed.
                    if let Ok(stale) = self.keys.record_key(index, previous, &id) {
                        if &stale != key {
                            self.delete_key(&stale)?;
                        }
                    }
                }
            }
            if self.options.debug {
                debug!(namespace = %self.namespace(), key = %key, "saving key");
            }
            self.store.write(key, &blob)?;
        }

        Ok(())
    }

    /// Reads the single record matching `query`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NoMatchingIndex`] if no index has the query's shape
    /// - [`CoreError::NotFound`] if nothing matches
    /// - [`CoreError::MultipleRecordsFound`] if more than one record matches
    pub fn read<T: DeserializeOwned>(&self, query: &Query) -> CoreResult<T> {
        let records = self.scan(query)?;
        match records.as_slice() {
            [] => Err(CoreError::NotFound),
            [record] => Ok(self.options.record_format.decode(&record.value)?),
            _ => Err(CoreError::MultipleRecordsFound {
                count: records.len(),
            }),
        }
    }

    /// Lists every record matching `query`, in the index's order.
    ///
    /// The query's offset and limit are applied after the scan.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NoMatchingIndex`] if no index has the query's shape
    /// - [`CoreError::Codec`] if a stored blob does not decode as `T`
    pub fn list<T: DeserializeOwned>(&self, query: &Query) -> CoreResult<Vec<T>> {
        let records = query.paginate(self.scan(query)?);
        records
            .iter()
            .map(|record| {
                self.options
                    .record_format
                    .decode(&record.value)
                    .map_err(CoreError::from)
            })
            .collect()
    }

    /// Deletes the record identified by `query`, together with every index
    /// key derived from it.
    ///
    /// Only identity lookups with a value are accepted.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnsupportedDeleteQuery`] if `query` is not an identity lookup
    /// - [`CoreError::NotFound`] if no record has that identity
    pub fn delete(&self, query: &Query) -> CoreResult<()> {
        if !self.id_index().matches(query) || query.value.is_none() {
            return Err(CoreError::unsupported_delete(&query.field_name));
        }

        let _guard = self.write_lock.lock();

        let records = self.scan(query)?;
        let record = records.first().ok_or(CoreError::NotFound)?;
        let fields = self.options.record_format.decode_fields(&record.value)?;
        let id = self.identity(&fields)?;

        // Identity key goes last so a failed delete can be retried by id.
        for index in &self.indexes {
            if let Ok(key) = self.keys.record_key(index, &fields, &id) {
                self.delete_key(&key)?;
            }
        }
        Ok(())
    }

    fn delete_key(&self, key: &str) -> CoreResult<()> {
        if self.options.debug {
            debug!(namespace = %self.namespace(), key = %key, "deleting key");
        }
        Ok(self.store.delete(key)?)
    }
}
