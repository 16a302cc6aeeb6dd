//! Record blob formats and field introspection.

use crate::error::{CodecError, CodecResult};
use crate::value::json_type_name;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record viewed as a generic field-name to value mapping.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Serialization format of the blobs stored under every index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// JSON text.
    #[default]
    Json,
    /// CBOR binary.
    Cbor,
}

impl RecordFormat {
    /// Serializes `record` into a blob.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EncodingFailed`] if serialization fails.
    pub fn encode<T: Serialize + ?Sized>(self, record: &T) -> CodecResult<Vec<u8>> {
        match self {
            Self::Json => {
                serde_json::to_vec(record).map_err(|e| CodecError::encoding_failed(e.to_string()))
            }
            Self::Cbor => {
                let mut buf = Vec::new();
                ciborium::into_writer(record, &mut buf)
                    .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
                Ok(buf)
            }
        }
    }

    /// Deserializes a blob produced by [`RecordFormat::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecodingFailed`] if the blob does not match `T`.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> CodecResult<T> {
        match self {
            Self::Json => {
                serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
            }
            Self::Cbor => ciborium::from_reader(bytes)
                .map_err(|e| CodecError::decoding_failed(e.to_string())),
        }
    }

    /// Decodes a blob into its generic field mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecodingFailed`] if the blob is not a map.
    pub fn decode_fields(self, bytes: &[u8]) -> CodecResult<Fields> {
        self.decode(bytes)
    }
}

/// Serializes `record` into its generic field mapping.
///
/// This is the single introspection step used to pull indexed values out of
/// arbitrary records.
///
/// # Errors
///
/// Returns [`CodecError::EncodingFailed`] if serialization fails and
/// [`CodecError::NotAnObject`] if the record is not a struct or map.
pub fn to_fields<T: Serialize + ?Sized>(record: &T) -> CodecResult<Fields> {
    match serde_json::to_value(record).map_err(|e| CodecError::encoding_failed(e.to_string()))? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(CodecError::NotAnObject {
            type_name: json_type_name(&other).to_string(),
        }),
    }
}
