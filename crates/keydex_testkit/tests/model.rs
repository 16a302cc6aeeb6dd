//! End-to-end tests of index maintenance over the in-memory store.

use keydex_core::{
    CoreError, CoreResult, Index, Model, ModelOptions, OrderType, Query, RecordFormat,
};
use keydex_storage::InMemoryStore;
use keydex_testkit::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

fn ids<T>(records: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
    records.iter().map(|r| id(r).to_string()).collect()
}

#[test]
fn round_trip_by_identity() {
    let users = TestModel::new("users", user_indexes());
    let ada = User::new("1", "ada", "ada@example.com", 36);
    users.save(&ada).unwrap();

    let found: User = users.read(&users.id_query("1")).unwrap();
    assert_eq!(found, ada);
}

#[test]
fn ascending_integer_listing() {
    let users = TestModel::new("users", vec![Index::by_equality("age").pad_length(19)]);
    users.save(&json!({"id": "1", "age": 30})).unwrap();
    users.save(&json!({"id": "2", "age": 5})).unwrap();

    let listed: Vec<serde_json::Value> = users.list(&Query::all("age")).unwrap();
    assert_eq!(listed[0]["id"], "2");
    assert_eq!(listed[1]["id"], "1");
}

#[test]
fn descending_integer_listing() {
    let users = TestModel::new("users", vec![Index::by_equality("age").descending()]);
    for (id, age) in [("a", 7), ("b", 120), ("c", 0), ("d", 33)] {
        users
            .save(&User::new(id, id, &format!("{id}@x.com"), age))
            .unwrap();
    }

    let query = Query::all("age").ordered(OrderType::Descending);
    let listed: Vec<User> = users.list(&query).unwrap();
    let ages: Vec<i64> = listed.iter().map(|u| u.age).collect();
    assert_eq!(ages, vec![120, 33, 7, 0]);
}

#[test]
fn equal_values_are_disambiguated_by_identity() {
    let users = TestModel::new("users", vec![Index::by_equality("age")]);
    users.save(&User::new("1", "a", "a@x.com", 30)).unwrap();
    users.save(&User::new("2", "b", "b@x.com", 30)).unwrap();

    let thirty: Vec<User> = users.list(&Query::equals("age", 30i64)).unwrap();
    assert_eq!(ids(&thirty, |u| u.id.as_str()), vec!["1", "2"]);
}

#[test]
fn ascending_strings_shorter_first() {
    let users = TestModel::new("users", vec![Index::by_equality("name").pad_length(8)]);
    for (id, name) in [("1", "abcd"), ("2", "ab"), ("3", "abc"), ("4", "b")] {
        users
            .save(&User::new(id, name, &format!("{id}@x.com"), 1))
            .unwrap();
    }

    let listed: Vec<User> = users.list(&Query::all("name")).unwrap();
    let names: Vec<&str> = listed.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["ab", "abc", "abcd", "b"]);
}

#[test]
fn descending_strings_with_base32_armor() {
    let users = TestModel::new("users", user_indexes());
    for (id, name) in [("1", "carol"), ("2", "ada"), ("3", "bob"), ("4", "adam")] {
        users
            .save(&User::new(id, name, &format!("{id}@x.com"), 1))
            .unwrap();
    }

    let query = Query::all("name").ordered(OrderType::Descending);
    let listed: Vec<User> = users.list(&query).unwrap();
    let names: Vec<&str> = listed.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["carol", "bob", "adam", "ada"]);

    assert!(users
        .keys_with_prefix("byDescOrderedName")
        .iter()
        .all(|k| k.is_ascii()));

    let bob: User = users
        .read(&Query::equals("name", "bob").ordered(OrderType::Descending))
        .unwrap();
    assert_eq!(bob.id, "3");
}

#[test]
fn update_replaces_stale_keys() {
    let mut harness = IntegrationHarness::new("users", user_indexes());
    harness
        .save(&User::new("1", "ada", "ada@example.com", 36))
        .unwrap();
    harness
        .save(&User::new("1", "ada lovelace", "ada@example.com", 37))
        .unwrap();
    harness.verify_keys();

    let users = &harness.model;
    assert_eq!(users.stored_keys().len(), 4);
    assert_eq!(users.keys_with_prefix("byOrderedAge").len(), 1);

    let old: CoreResult<User> = users.read(&Query::equals("age", 36i64));
    assert!(old.unwrap_err().is_not_found());
    let new: User = users.read(&Query::equals("age", 37i64)).unwrap();
    assert_eq!(new.name, "ada lovelace");

    // Unchanged fields keep their key but carry the new blob.
    let by_email: User = users.read(&Query::equals("email", "ada@example.com")).unwrap();
    assert_eq!(by_email.age, 37);
}

#[test]
fn unique_email_scenario() {
    let users = TestModel::new("users", vec![Index::by_equality("email").unique()]);
    users.save(&json!({"id": "1", "email": "a@x.com"})).unwrap();

    let clash = users.save(&json!({"id": "2", "email": "a@x.com"}));
    assert!(matches!(
        clash,
        Err(CoreError::UniqueConstraintViolation { ref field }) if field == "email"
    ));
    let missing: CoreResult<serde_json::Value> = users.read(&users.id_query("2"));
    assert!(missing.unwrap_err().is_not_found());

    users.save(&json!({"id": "1", "email": "b@x.com"})).unwrap();
    let old: CoreResult<serde_json::Value> = users.read(&Query::equals("email", "a@x.com"));
    assert!(old.unwrap_err().is_not_found());
    let new: serde_json::Value = users.read(&Query::equals("email", "b@x.com")).unwrap();
    assert_eq!(new["id"], "1");

    // The released value is free again.
    users.save(&json!({"id": "2", "email": "a@x.com"})).unwrap();
}

#[test]
fn unique_violation_leaves_first_record_intact() {
    let mut harness = IntegrationHarness::new("users", user_indexes());
    harness
        .save(&User::new("1", "ada", "same@x.com", 36))
        .unwrap();
    let result = harness.save(&User::new("2", "bob", "same@x.com", 50));
    assert!(matches!(
        result,
        Err(CoreError::UniqueConstraintViolation { .. })
    ));
    harness.verify_keys();
}

#[test]
fn no_matching_index() {
    let users = TestModel::new("users", user_indexes());

    let by_height: CoreResult<Vec<User>> = users.list(&Query::all("height"));
    assert!(matches!(
        by_height,
        Err(CoreError::NoMatchingIndex { ref field, ref kind }) if field == "height" && kind == "eq"
    ));

    let age_desc: CoreResult<Vec<User>> =
        users.list(&Query::all("age").ordered(OrderType::Descending));
    assert!(matches!(age_desc, Err(CoreError::NoMatchingIndex { .. })));

    // The identity index is unordered, so an ascending id query has no index.
    let id_asc: CoreResult<User> = users.read(&Query::equals("id", "1"));
    assert!(matches!(id_asc, Err(CoreError::NoMatchingIndex { .. })));
}

#[test]
fn filter_by_tag_ordered_by_creation() {
    let mut harness = IntegrationHarness::new("posts", post_indexes());
    harness.save(&Post::new("p1", "intro", "rust", 10)).unwrap();
    harness.save(&Post::new("p2", "traits", "rust", 30)).unwrap();
    harness.save(&Post::new("p3", "gc", "go", 20)).unwrap();
    harness.save(&Post::new("p4", "async", "rust", 20)).unwrap();

    let by_tag = &post_indexes()[1];
    let rust: Vec<Post> = harness.model.list(&by_tag.query("rust")).unwrap();
    assert_eq!(ids(&rust, |p| p.id.as_str()), vec!["p2", "p4", "p1"]);

    // Moving a post in time rewrites its ordered key.
    harness.save(&Post::new("p1", "intro", "rust", 40)).unwrap();
    harness.verify_keys();
    let rust: Vec<Post> = harness.model.list(&by_tag.query("rust")).unwrap();
    assert_eq!(ids(&rust, |p| p.id.as_str()), vec!["p1", "p2", "p4"]);

    // Retagging moves it between filter groups.
    harness.save(&Post::new("p1", "intro", "go", 40)).unwrap();
    harness.verify_keys();
    let go: Vec<Post> = harness.model.list(&by_tag.query("go")).unwrap();
    assert_eq!(ids(&go, |p| p.id.as_str()), vec!["p1", "p3"]);
}

#[test]
fn unique_unordered_slug() {
    let posts = TestModel::new("posts", post_indexes());
    posts.save(&Post::new("p1", "hi-there", "rust", 1)).unwrap();

    let by_slug = &post_indexes()[0];
    let found: Post = posts.read(&by_slug.query("hi-there")).unwrap();
    assert_eq!(found.id, "p1");

    let clash = posts.save(&Post::new("p2", "hi-there", "rust", 2));
    assert!(matches!(
        clash,
        Err(CoreError::UniqueConstraintViolation { ref field }) if field == "slug"
    ));
}

#[test]
fn values_containing_separator_stay_apart() {
    let mut harness = IntegrationHarness::new("posts", post_indexes());
    harness.save(&Post::new("p:1", "hi:there", "rust:x", 10)).unwrap();
    harness.save(&Post::new("p", "hi", "rust", 20)).unwrap();
    harness.save(&Post::new("p", "hi", "rust", 30)).unwrap();
    harness.verify_keys();

    let by_slug = &post_indexes()[0];
    let by_tag = &post_indexes()[1];
    let rust: Vec<Post> = harness.model.list(&by_tag.query("rust")).unwrap();
    assert_eq!(ids(&rust, |p| p.id.as_str()), vec!["p"]);
    let hi: Post = harness.model.read(&by_slug.query("hi")).unwrap();
    assert_eq!(hi.created, 30);
    let p: Post = harness.model.read(&harness.model.id_query("p")).unwrap();
    assert_eq!(p.slug, "hi");

    harness.delete("p").unwrap();
    harness.verify_keys();
    assert!(harness.contains("p:1"));
    assert_eq!(harness.model.stored_keys().len(), 3);
}

#[test]
fn delete_removes_secondary_keys() {
    let mut harness = IntegrationHarness::new("users", user_indexes());
    harness
        .save(&User::new("1", "ada", "ada@example.com", 36))
        .unwrap();
    harness
        .save(&User::new("2", "bob", "bob@example.com", 41))
        .unwrap();

    harness.delete("1").unwrap();
    harness.verify_keys();

    let users = &harness.model;
    let listed: Vec<User> = users.list(&Query::all("age")).unwrap();
    assert_eq!(ids(&listed, |u| u.id.as_str()), vec!["2"]);
    let gone: CoreResult<User> = users.read(&users.id_query("1"));
    assert!(gone.unwrap_err().is_not_found());

    assert!(harness.delete("1").unwrap_err().is_not_found());
}

#[test]
fn delete_requires_identity_query() {
    let users = TestModel::new("users", user_indexes());
    users
        .save(&User::new("1", "ada", "ada@example.com", 36))
        .unwrap();

    let result = users.delete(&Query::equals("email", "ada@example.com"));
    assert!(matches!(
        result,
        Err(CoreError::UnsupportedDeleteQuery { ref field }) if field == "email"
    ));
    assert_eq!(users.stored_keys().len(), 4);
}

#[test]
fn pagination() {
    let users = TestModel::new("users", vec![Index::by_equality("age")]);
    for age in 0..10i64 {
        let id = age.to_string();
        users
            .save(&User::new(&id, "x", &format!("{id}@x.com"), age))
            .unwrap();
    }

    let page: Vec<User> = users.list(&Query::all("age").offset(3).limit(4)).unwrap();
    let ages: Vec<i64> = page.iter().map(|u| u.age).collect();
    assert_eq!(ages, vec![3, 4, 5, 6]);

    let tail: Vec<User> = users.list(&Query::all("age").offset(8)).unwrap();
    assert_eq!(tail.len(), 2);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Account {
    uuid: String,
    handle: String,
    active: bool,
}

#[test]
fn custom_identity_field() {
    let accounts = TestModel::with_options(
        "accounts",
        vec![Index::by_equality("active").unordered()],
        ModelOptions::new().id_field("uuid"),
    );
    let account = Account {
        uuid: "u-1".into(),
        handle: "ada".into(),
        active: true,
    };
    accounts.save(&account).unwrap();

    assert!(accounts
        .stored_keys()
        .contains(&"accounts:byUuid:u-1:u-1".to_string()));
    assert!(accounts
        .stored_keys()
        .contains(&"accounts:byActive:true:u-1".to_string()));

    let found: Account = accounts.read(&accounts.id_query("u-1")).unwrap();
    assert_eq!(found, account);

    let active: Vec<Account> = accounts
        .list(&Query::equals("active", true).ordered(OrderType::Unordered))
        .unwrap();
    assert_eq!(active.len(), 1);

    let missing_id = accounts.save(&json!({"handle": "bob", "active": false}));
    assert!(matches!(
        missing_id,
        Err(CoreError::MissingIdentity { ref field }) if field == "uuid"
    ));
}

#[test]
fn integer_identities() {
    let users = TestModel::new("users", vec![]);
    users.save(&json!({"id": 1, "name": "a"})).unwrap();
    users.save(&json!({"id": 10, "name": "b"})).unwrap();

    let one: serde_json::Value = users.read(&users.id_query(1i64)).unwrap();
    assert_eq!(one["name"], "a");
}

#[test]
fn cbor_blobs_end_to_end() {
    let mut harness = IntegrationHarness::with_options(
        "users",
        user_indexes(),
        ModelOptions::new().record_format(RecordFormat::Cbor),
    );
    harness
        .save(&User::new("1", "ada", "ada@example.com", 36))
        .unwrap();
    harness
        .save(&User::new("1", "ada", "ada@example.com", 40))
        .unwrap();
    harness.verify_keys();

    let found: User = harness.model.read(&Query::equals("age", 40i64)).unwrap();
    assert_eq!(found.name, "ada");
}

#[test]
fn namespaces_share_a_store() {
    let store = Arc::new(InMemoryStore::new());
    let users = Model::new(
        store.clone(),
        "users",
        vec![Index::by_equality("age")],
        ModelOptions::default(),
    );
    let admins = Model::new(
        store.clone(),
        "admins",
        vec![Index::by_equality("age")],
        ModelOptions::default(),
    );

    users.save(&User::new("1", "ada", "a@x.com", 36)).unwrap();
    admins.save(&User::new("1", "root", "r@x.com", 99)).unwrap();

    let listed: Vec<User> = users.list(&Query::all("age")).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "ada");
    assert_eq!(store.len(), 4);
}

#[test]
fn debug_logging_has_no_behavioural_effect() {
    init_tracing();
    let mut harness = IntegrationHarness::with_options(
        "users",
        user_indexes(),
        ModelOptions::new().debug(true),
    );
    harness
        .save(&User::new("1", "ada", "ada@example.com", 36))
        .unwrap();
    harness
        .save(&User::new("1", "ada", "ada@example.com", 37))
        .unwrap();
    harness.delete("1").unwrap();
    harness.verify_keys();
    assert!(harness.model.stored_keys().is_empty());
}

#[test]
fn concurrent_saves_of_one_identity() {
    let mut harness = IntegrationHarness::new("users", user_indexes());
    let model = &harness.model.model;

    std::thread::scope(|scope| {
        for worker in 0..8i64 {
            scope.spawn(move || {
                for round in 0..25i64 {
                    let user = User::new("1", "ada", "ada@example.com", worker * 100 + round);
                    model.save(&user).unwrap();
                }
            });
        }
    });

    let last: User = model.read(&model.id_query("1")).unwrap();
    assert_eq!(harness.model.keys_with_prefix("byOrderedAge").len(), 1);

    // Re-saving the surviving version lets the harness check every key.
    harness.save(&last).unwrap();
    harness.verify_keys();
}
