//! Error types for keydex core.

use keydex_codec::CodecError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in index maintenance and lookups.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] keydex_storage::StorageError),

    /// Record serialization error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// No record matches the query.
    #[error("not found")]
    NotFound,

    /// A single-record read matched more than one record.
    #[error("multiple records found: {count}")]
    MultipleRecordsFound {
        /// Number of records the query matched.
        count: usize,
    },

    /// The query shape does not correspond to any declared index.
    #[error("for query type '{kind}', field '{field}' does not match any indexes")]
    NoMatchingIndex {
        /// Field the query filters on.
        field: String,
        /// Kind of the query.
        kind: String,
    },

    /// The record has no usable identity value.
    #[error("record is missing identity field '{field}'")]
    MissingIdentity {
        /// The configured identity field.
        field: String,
    },

    /// A unique index value is already owned by another record.
    #[error("unique index on '{field}' violated")]
    UniqueConstraintViolation {
        /// The unique field.
        field: String,
    },

    /// A field value has no order-preserving key encoding.
    #[error("unsupported encoding for field '{field}': {type_name}")]
    UnsupportedEncoding {
        /// The indexed field.
        field: String,
        /// Runtime type of the offending value.
        type_name: String,
    },

    /// Delete was requested with a non-identity query.
    #[error("delete query on '{field}' does not match the identity index")]
    UnsupportedDeleteQuery {
        /// Field the rejected query filters on.
        field: String,
    },
}

impl CoreError {
    /// Creates a no matching index error.
    pub fn no_matching_index(field: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::NoMatchingIndex {
            field: field.into(),
            kind: kind.into(),
        }
    }

    /// Creates a missing identity error.
    pub fn missing_identity(field: impl Into<String>) -> Self {
        Self::MissingIdentity {
            field: field.into(),
        }
    }

    /// Creates a unique constraint violation error.
    pub fn unique_violation(field: impl Into<String>) -> Self {
        Self::UniqueConstraintViolation {
            field: field.into(),
        }
    }

    /// Creates an unsupported delete query error.
    pub fn unsupported_delete(field: impl Into<String>) -> Self {
        Self::UnsupportedDeleteQuery {
            field: field.into(),
        }
    }

    /// Attaches a field name to a codec error.
    ///
    /// Unsupported types become [`CoreError::UnsupportedEncoding`]; every
    /// other codec error passes through unchanged.
    pub fn for_field(field: &str, err: CodecError) -> Self {
        match err {
            CodecError::UnsupportedType { type_name } => Self::UnsupportedEncoding {
                field: field.to_string(),
                type_name,
            },
            other => Self::Codec(other),
        }
    }

    /// Returns true if this is a [`CoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
