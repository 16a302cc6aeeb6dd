//! Store key layout.
//!
//! Every index entry lives under
//!
//! ```text
//! namespace ":" indexPrefix [ ":" filterValue ] ":" encodedOrderValue ":" id
//! ```
//!
//! `filterValue` is present only when an index filters on one field and
//! orders on another. Scan keys stop right after a `:` separator so that a
//! value never matches a longer value sharing its prefix (`id=1` vs `id=10`).
//! Raw segments are not escaped, so a value containing `:` can still fall
//! under a shorter value's scan key; [`Model`](crate::Model) filters scanned
//! records by their decoded field.

use crate::error::{CoreError, CoreResult};
use crate::index::Index;
use crate::query::Query;
use keydex_codec::{encode_fragment, FieldValue, Fields};

/// Key separator.
pub const SEPARATOR: char = ':';

/// Renders store keys for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    namespace: String,
}

impl KeyBuilder {
    /// Creates a key builder for `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the prefix shared by every key of `index`, including the
    /// trailing separator.
    pub fn index_prefix(&self, index: &Index) -> String {
        format!(
            "{ns}{sep}{prefix}{sep}",
            ns = self.namespace,
            sep = SEPARATOR,
            prefix = index.prefix()
        )
    }

    /// Returns the key under which `fields` is stored for `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedEncoding`] if an indexed field is
    /// missing or holds a value without a key encoding.
    pub fn record_key(&self, index: &Index, fields: &Fields, id: &FieldValue) -> CoreResult<String> {
        let mut key = self.index_prefix(index);
        if index.has_separate_order_field() {
            let filter = field_value(fields, &index.field_name)?;
            key.push_str(&filter.to_string());
            key.push(SEPARATOR);
        }
        let order_field = index.order_field();
        let value = field_value(fields, order_field)?;
        key.push_str(&fragment(index, order_field, &value)?);
        key.push(SEPARATOR);
        key.push_str(&id.to_string());
        Ok(key)
    }

    /// Returns the prefix to scan for `query` on `index`.
    ///
    /// Without a value the whole index is scanned. For indexes with a
    /// separate order field the value filters on the filter field and every
    /// order value below it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedEncoding`] if the query value has no
    /// key encoding under the index's order.
    pub fn scan_key(&self, index: &Index, query: &Query) -> CoreResult<String> {
        let mut key = self.index_prefix(index);
        let Some(value) = &query.value else {
            return Ok(key);
        };
        if index.has_separate_order_field() {
            key.push_str(&value.to_string());
        } else {
            key.push_str(&fragment(index, &index.field_name, value)?);
        }
        key.push(SEPARATOR);
        Ok(key)
    }
}

/// Reads `name` from `fields` as an indexable value.
///
/// # Errors
///
/// Returns [`CoreError::UnsupportedEncoding`] if the field is missing or
/// holds a value outside the supported kinds.
pub fn field_value(fields: &Fields, name: &str) -> CoreResult<FieldValue> {
    let Some(raw) = fields.get(name) else {
        return Err(CoreError::UnsupportedEncoding {
            field: name.to_string(),
            type_name: "null".into(),
        });
    };
    FieldValue::from_json(raw).map_err(|e| CoreError::for_field(name, e))
}

fn fragment(index: &Index, field: &str, value: &FieldValue) -> CoreResult<String> {
    encode_fragment(
        value,
        index.order_type(),
        index.string_pad_length,
        index.base32,
    )
    .map_err(|e| CoreError::for_field(field, e))
}
