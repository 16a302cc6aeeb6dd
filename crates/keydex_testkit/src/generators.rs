//! Property-based test generators using proptest.
//!
//! Strategies produce records whose indexed fields stay inside the encodable
//! range: non-negative ages and names shorter than the index pad length.

use crate::fixtures::User;
use proptest::prelude::*;

/// Strategy for generating user identities.
pub fn user_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,6}").expect("Invalid regex")
}

/// Strategy for generating names that fit the default user name index.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z ]{1,16}").expect("Invalid regex")
}

/// Strategy for generating ages.
pub fn age_strategy() -> impl Strategy<Value = i64> {
    0i64..200
}

/// Strategy for generating a user. Emails are derived from the identity so
/// they never collide between different users.
pub fn user_strategy() -> impl Strategy<Value = User> {
    (user_id_strategy(), name_strategy(), age_strategy())
        .prop_map(|(id, name, age)| User::new(&id, &name, &format!("{id}@example.com"), age))
}

/// Strategy for generating users with distinct identities.
pub fn distinct_users_strategy(max: usize) -> impl Strategy<Value = Vec<User>> {
    prop::collection::btree_map(user_id_strategy(), (name_strategy(), age_strategy()), 1..max)
        .prop_map(|users| {
            users
                .into_iter()
                .map(|(id, (name, age))| {
                    User::new(&id, &name, &format!("{id}@example.com"), age)
                })
                .collect()
        })
}

/// A model operation.
#[derive(Debug, Clone)]
pub enum ModelOp {
    /// Save (insert or update) a user.
    Save(User),
    /// Delete a user by identity.
    Delete(String),
}

/// Strategy for generating a single operation over a small identity space,
/// so updates and deletes hit existing records often.
pub fn model_op_strategy() -> impl Strategy<Value = ModelOp> {
    let id = prop::sample::select(vec!["1", "2", "3", "4"]);
    prop_oneof![
        3 => (id.clone(), name_strategy(), age_strategy()).prop_map(|(id, name, age)| {
            ModelOp::Save(User::new(id, &name, &format!("{id}@example.com"), age))
        }),
        1 => id.prop_map(|id| ModelOp::Delete(id.to_string())),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn model_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<ModelOp>> {
    prop::collection::vec(model_op_strategy(), 1..max_len)
}
