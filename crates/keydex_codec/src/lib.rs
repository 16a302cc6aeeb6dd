//! # keydex Codec
//!
//! Key and record encoding for keydex.
//!
//! This crate provides:
//! - [`FieldValue`], the closed set of value kinds an index can be built on
//! - [`encode_fragment`], the order-preserving key fragment encoder
//! - [`RecordFormat`], the blob format stored under every index key
//! - [`to_fields`], the field introspection step used by the index layer
//!
//! ## Ordering Rules
//!
//! - Integers are zero-padded to 19 digits; descending integers are
//!   stored as `i64::MAX - n`
//! - Ordered strings are padded to a fixed character count; descending
//!   strings mirror every character and may be base32hex-armored, with
//!   `=` padding replaced by [`ARMOR_PAD`]
//! - Unordered fragments are the raw value
//! - Booleans are `true` / `false` regardless of order
//!
//! ## Usage
//!
//! ```
//! use keydex_codec::{encode_fragment, FieldValue, OrderType};
//!
//! let young = encode_fragment(&FieldValue::Integer(5), OrderType::Ascending, 16, false).unwrap();
//! let old = encode_fragment(&FieldValue::Integer(30), OrderType::Ascending, 16, false).unwrap();
//! assert!(young < old);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod encoder;
mod error;
mod record;
mod value;

pub use encoder::{encode_fragment, ARMOR_PAD, INTEGER_WIDTH};
pub use error::{CodecError, CodecResult};
pub use record::{to_fields, Fields, RecordFormat};
pub use value::{json_type_name, FieldValue, OrderType};
