//! Index definitions.
//!
//! An [`Index`] is a declarative description of one access path: which
//! field it filters on, which field orders its keys, and how string values
//! are laid out. Definitions are fixed when a model is built.

use crate::query::Query;
use keydex_codec::{FieldValue, OrderType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pad length given to ordered strings unless the index overrides it.
pub const DEFAULT_STRING_PAD_LENGTH: usize = 16;

/// Kind of lookup an index answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexKind {
    /// Exact match on the filter field.
    #[default]
    #[serde(rename = "eq")]
    Equality,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equality => f.write_str("eq"),
        }
    }
}

/// Ordering of an index's keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Field whose value orders the keys. Empty means the filter field.
    pub field_name: String,
    /// Sort direction.
    pub order_type: OrderType,
}

impl Order {
    /// Creates an order on `field_name`.
    pub fn new(field_name: impl Into<String>, order_type: OrderType) -> Self {
        Self {
            field_name: field_name.into(),
            order_type,
        }
    }
}

/// A declared index.
///
/// # Example
///
/// ```rust
/// use keydex_core::Index;
///
/// // Unique, case-sensitive lookup by email.
/// let by_email = Index::by_equality("email").unique();
///
/// // Posts with a given tag, newest first.
/// let by_tag = Index::by_equality("tag").ordered_by("created").descending();
///
/// assert_eq!(by_email.prefix(), "byOrderedEmail");
/// assert_eq!(by_tag.prefix(), "byDescOrderedTag");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Field the index filters on.
    pub field_name: String,
    /// Kind of lookup.
    pub kind: IndexKind,
    /// Key ordering.
    pub order: Order,
    /// Reject two records sharing a value of `field_name`.
    pub unique: bool,
    /// Character count ordered strings are padded to. Must exceed the
    /// longest expected value; shorter pads silently break ordering.
    pub string_pad_length: usize,
    /// Base32hex-armor descending strings.
    pub base32: bool,
}

impl Index {
    /// Creates an ascending equality index on `field_name`.
    pub fn by_equality(field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            order: Order::new(field_name.clone(), OrderType::Ascending),
            field_name,
            kind: IndexKind::Equality,
            unique: false,
            string_pad_length: DEFAULT_STRING_PAD_LENGTH,
            base32: false,
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Orders keys ascending.
    #[must_use]
    pub fn ascending(mut self) -> Self {
        self.order.order_type = OrderType::Ascending;
        self
    }

    /// Orders keys descending.
    #[must_use]
    pub fn descending(mut self) -> Self {
        self.order.order_type = OrderType::Descending;
        self
    }

    /// Stores raw values; only equality lookups stay meaningful.
    #[must_use]
    pub fn unordered(mut self) -> Self {
        self.order.order_type = OrderType::Unordered;
        self
    }

    /// Orders keys by `field_name` instead of the filter field.
    #[must_use]
    pub fn ordered_by(mut self, field_name: impl Into<String>) -> Self {
        self.order.field_name = field_name.into();
        self
    }

    /// Sets the pad length of ordered strings.
    #[must_use]
    pub fn pad_length(mut self, length: usize) -> Self {
        self.string_pad_length = length;
        self
    }

    /// Base32hex-armors descending strings.
    #[must_use]
    pub fn base32(mut self) -> Self {
        self.base32 = true;
        self
    }

    /// Returns the sort direction.
    pub fn order_type(&self) -> OrderType {
        self.order.order_type
    }

    /// Returns the field whose value orders the keys.
    pub fn order_field(&self) -> &str {
        if self.order.field_name.is_empty() {
            &self.field_name
        } else {
            &self.order.field_name
        }
    }

    /// Returns true when keys are filtered by one field and ordered by another.
    pub fn has_separate_order_field(&self) -> bool {
        self.order_field() != self.field_name
    }

    /// Returns true if `query` has this index's shape.
    pub fn matches(&self, query: &Query) -> bool {
        self.field_name == query.field_name
            && self.kind == query.kind
            && self.order.order_type == query.order.order_type
    }

    /// Returns the index name segment of its keys.
    ///
    /// `by<Field>` for unordered indexes, `byOrdered<Field>` for ascending
    /// and `byDescOrdered<Field>` for descending ones.
    pub fn prefix(&self) -> String {
        let field = title_case(&self.field_name);
        match self.order.order_type {
            OrderType::Unordered => format!("by{field}"),
            OrderType::Ascending => format!("byOrdered{field}"),
            OrderType::Descending => format!("byDescOrdered{field}"),
        }
    }

    /// Builds a query for records whose filter field equals `value`.
    pub fn query(&self, value: impl Into<FieldValue>) -> Query {
        Query {
            value: Some(value.into()),
            ..self.query_all()
        }
    }

    /// Builds a query listing every record in this index.
    pub fn query_all(&self) -> Query {
        Query {
            field_name: self.field_name.clone(),
            kind: self.kind,
            order: self.order.clone(),
            value: None,
            offset: 0,
            limit: 0,
        }
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
