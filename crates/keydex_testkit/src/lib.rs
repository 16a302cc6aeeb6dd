//! # keydex Testkit
//!
//! Test utilities for keydex.
//!
//! This crate provides:
//! - Sample record types and in-memory model helpers
//! - Property-based test generators using proptest
//! - An integration harness that checks every live record has exactly one
//!   key per index
//!
//! ## Usage
//!
//! ```rust
//! use keydex_testkit::prelude::*;
//!
//! let users = TestModel::new("users", user_indexes());
//! users.save(&User::new("1", "ada", "ada@example.com", 36)).unwrap();
//! assert_eq!(users.stored_keys().len(), 4);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
