//! Model configuration.

use crate::index::Index;
use keydex_codec::RecordFormat;

/// Field used as record identity unless configured otherwise.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Returns the identity index used when none is configured: an unordered
/// equality index on `id`.
pub fn default_id_index() -> Index {
    Index::by_equality(DEFAULT_ID_FIELD).unordered()
}

/// Configuration for a [`crate::Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    /// Emit a `debug` event for every key written, scanned and deleted.
    /// Purely diagnostic.
    pub debug: bool,

    /// Index over the identity field. Always maintained, always matched last.
    pub id_index: Index,

    /// Blob format stored under every key.
    pub record_format: RecordFormat,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            debug: false,
            id_index: default_id_index(),
            record_format: RecordFormat::Json,
        }
    }
}

impl ModelOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether key-level debug events are emitted.
    #[must_use]
    pub fn debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    /// Replaces the identity index.
    #[must_use]
    pub fn id_index(mut self, index: Index) -> Self {
        self.id_index = index;
        self
    }

    /// Uses `field` as the identity field, with an unordered index on it.
    #[must_use]
    pub fn id_field(self, field: impl Into<String>) -> Self {
        self.id_index(Index::by_equality(field).unordered())
    }

    /// Sets the blob format.
    #[must_use]
    pub fn record_format(mut self, format: RecordFormat) -> Self {
        self.record_format = format;
        self
    }

    /// Returns the identity field name.
    pub fn id_field_name(&self) -> &str {
        &self.id_index.field_name
    }
}
