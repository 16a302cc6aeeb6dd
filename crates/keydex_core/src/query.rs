//! Queries against declared indexes.

use crate::index::{IndexKind, Order};
use keydex_codec::{FieldValue, OrderType};

/// A lookup request.
///
/// A query must have the shape of exactly one declared index - the same
/// field, kind and order direction - or the model rejects it.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Field to filter on.
    pub field_name: String,
    /// Kind of lookup.
    pub kind: IndexKind,
    /// Requested ordering.
    pub order: Order,
    /// Value to match. `None` lists the whole index.
    pub value: Option<FieldValue>,
    /// Number of matching records to skip.
    pub offset: usize,
    /// Maximum number of records to return. Zero means unlimited.
    pub limit: usize,
}

impl Query {
    /// Ascending equality query on `field_name`.
    pub fn equals(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::all(field_name)
        }
    }

    /// Ascending query listing every record indexed on `field_name`.
    pub fn all(field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            order: Order::new(field_name.clone(), OrderType::Ascending),
            field_name,
            kind: IndexKind::Equality,
            value: None,
            offset: 0,
            limit: 0,
        }
    }

    /// Requests a different order direction.
    #[must_use]
    pub fn ordered(mut self, order_type: OrderType) -> Self {
        self.order.order_type = order_type;
        self
    }

    /// Skips the first `offset` matches.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns at most `limit` matches.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Applies offset and limit to an already ordered result set.
    pub(crate) fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let take = if self.limit == 0 {
            usize::MAX
        } else {
            self.limit
        };
        items.into_iter().skip(self.offset).take(take).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_defaults_to_ascending() {
        let query = Query::equals("email", "a@x.com");
        assert_eq!(query.field_name, "email");
        assert_eq!(query.kind, IndexKind::Equality);
        assert_eq!(query.order.order_type, OrderType::Ascending);
        assert_eq!(query.order.field_name, "email");
        assert_eq!(query.value, Some(FieldValue::from("a@x.com")));
    }

    #[test]
    fn all_has_no_value() {
        let query = Query::all("age").ordered(OrderType::Descending);
        assert!(query.value.is_none());
        assert_eq!(query.order.order_type, OrderType::Descending);
    }

    #[test]
    fn paginate_applies_offset_and_limit() {
        let items: Vec<i32> = (0..10).collect();
        assert_eq!(Query::all("x").paginate(items.clone()), items);
        assert_eq!(Query::all("x").offset(8).paginate(items.clone()), vec![8, 9]);
        assert_eq!(
            Query::all("x").offset(2).limit(3).paginate(items.clone()),
            vec![2, 3, 4]
        );
        assert!(Query::all("x").offset(20).paginate(items).is_empty());
    }
}
