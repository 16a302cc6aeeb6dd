//! Test fixtures and model helpers.
//!
//! Provides sample record types, the index sets used across tests, and an
//! in-memory model that keeps a handle on its store for key inspection.

use keydex_core::{Index, Model, ModelOptions};
use keydex_storage::InMemoryStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A sample user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email, unique under [`user_indexes`].
    pub email: String,
    /// Age in years.
    pub age: i64,
}

impl User {
    /// Creates a user.
    pub fn new(id: &str, name: &str, email: &str, age: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            age,
        }
    }
}

/// A sample blog post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Identity.
    pub id: String,
    /// URL slug, unique under [`post_indexes`].
    pub slug: String,
    /// Tag posts are grouped by.
    pub tag: String,
    /// Creation time in seconds.
    pub created: i64,
    /// Whether the post is published.
    pub published: bool,
}

impl Post {
    /// Creates a published post.
    pub fn new(id: &str, slug: &str, tag: &str, created: i64) -> Self {
        Self {
            id: id.to_string(),
            slug: slug.to_string(),
            tag: tag.to_string(),
            created,
            published: true,
        }
    }
}

/// Indexes for [`User`]: ascending age, unique email, descending
/// base32-armored name.
pub fn user_indexes() -> Vec<Index> {
    vec![
        Index::by_equality("age"),
        Index::by_equality("email").unique(),
        Index::by_equality("name").descending().pad_length(32).base32(),
    ]
}

/// Indexes for [`Post`]: unique unordered slug, and tag ordered by
/// creation time, newest first.
pub fn post_indexes() -> Vec<Index> {
    vec![
        Index::by_equality("slug").unordered().unique(),
        Index::by_equality("tag").ordered_by("created").descending(),
    ]
}

/// A model over its own in-memory store.
pub struct TestModel {
    /// The backing store, for key inspection.
    pub store: Arc<InMemoryStore>,
    /// The model under test.
    pub model: Model,
}

impl TestModel {
    /// Creates a model with default options.
    pub fn new(namespace: &str, indexes: Vec<Index>) -> Self {
        Self::with_options(namespace, indexes, ModelOptions::default())
    }

    /// Creates a model with the given options.
    pub fn with_options(namespace: &str, indexes: Vec<Index>, options: ModelOptions) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let model = Model::new(store.clone(), namespace, indexes, options);
        Self { store, model }
    }

    /// Returns every key in the store, in order.
    pub fn stored_keys(&self) -> Vec<String> {
        self.store.keys()
    }

    /// Returns the keys under `prefix`, relative to the namespace.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let full = format!("{}:{}", self.model.namespace(), prefix);
        self.stored_keys()
            .into_iter()
            .filter(|k| k.starts_with(&full))
            .collect()
    }
}

impl std::ops::Deref for TestModel {
    type Target = Model;

    fn deref(&self) -> &Self::Target {
        &self.model
    }
}

/// Installs a test-friendly tracing subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
