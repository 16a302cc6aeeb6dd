//! # keydex Core
//!
//! Secondary index maintenance on top of an ordered key-value store.
//!
//! Given a store that can only write, delete, and scan by prefix, a
//! [`Model`] lets callers declare indexes over record fields and keeps an
//! extra key per index in step with every save, so records can later be
//! looked up or range-scanned by any indexed field.
//!
//! This crate provides:
//! - [`Index`] definitions (filter field, order field and direction,
//!   uniqueness, string layout)
//! - [`Query`] values and index matching
//! - [`KeyBuilder`], the store key layout
//! - [`Model`], which fans saves out to every index, removes stale keys,
//!   enforces uniqueness, and answers reads and ordered listings
//!
//! ## Key Layout
//!
//! ```text
//! users:byId:1:1
//! users:byOrderedAge:0000000000000000030:1
//! users:byDescOrderedName:<mirrored, padded name>:1
//! posts:byOrderedTag:rust:0000000000000000005:p1
//! ```
//!
//! ## Limitations
//!
//! - No multi-key atomicity: a failed save can leave some index keys stale
//! - Negative integers cannot be stored under ordered indexes
//! - Float fragments are not padded and do not range-scan reliably
//! - Index definitions are fixed; changing one does not migrate old keys

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod index;
mod keys;
mod model;
mod query;

pub use config::{default_id_index, ModelOptions, DEFAULT_ID_FIELD};
pub use error::{CoreError, CoreResult};
pub use index::{Index, IndexKind, Order, DEFAULT_STRING_PAD_LENGTH};
pub use keys::{field_value, KeyBuilder, SEPARATOR};
pub use model::Model;
pub use query::Query;

pub use keydex_codec::{FieldValue, OrderType, RecordFormat};
