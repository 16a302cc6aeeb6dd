//! # keydex Storage
//!
//! Ordered key-value store abstraction for keydex.
//!
//! This crate provides the lowest-level storage abstraction that the index
//! layer is built on. Stores are **opaque ordered maps** from string keys to
//! byte blobs - they do not interpret keys or values.
//!
//! ## Design Principles
//!
//! - Three operations only: write, read (exact or by prefix), delete
//! - Prefix scans return records in the store's native key order
//! - No transactions, no multi-key atomicity
//! - Must be `Send + Sync` so one store can back several models
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral storage
//!
//! ## Example
//!
//! ```rust
//! use keydex_storage::{InMemoryStore, KeyValueStore};
//!
//! let store = InMemoryStore::new();
//! store.write("users:byId:1:1", b"{\"id\":\"1\"}").unwrap();
//! let records = store.read("users:byId:", true).unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].key, "users:byId:1:1");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStore;
pub use store::{KeyValueStore, Record};
