//! Query constraints and their translation to a `structuredQuery`.

use std::fmt;
use std::str::FromStr;

use serde_json::{Value, json};

use super::path::field_path;
use super::value::encode;

/// Comparison operator of a `where` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
    In,
    ArrayContainsAny,
    NotIn,
}

impl FilterOp {
    /// Operator name on the wire.
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Self::ArrayContains => "ARRAY_CONTAINS",
            Self::In => "IN",
            Self::ArrayContainsAny => "ARRAY_CONTAINS_ANY",
            Self::NotIn => "NOT_IN",
        }
    }

    /// Client-side spelling, e.g. `==` or `array-contains`.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::ArrayContains => "array-contains",
            Self::In => "in",
            Self::ArrayContainsAny => "array-contains-any",
            Self::NotIn => "not-in",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for FilterOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            "<" => Ok(Self::LessThan),
            "<=" => Ok(Self::LessThanOrEqual),
            ">" => Ok(Self::GreaterThan),
            ">=" => Ok(Self::GreaterThanOrEqual),
            "array-contains" => Ok(Self::ArrayContains),
            "in" => Ok(Self::In),
            "array-contains-any" => Ok(Self::ArrayContainsAny),
            "not-in" => Ok(Self::NotIn),
            other => Err(format!("unknown filter operator: {other}")),
        }
    }
}

/// Sort direction of an `order_by` constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Asc => "ASCENDING",
            Self::Desc => "DESCENDING",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// One filter, sort or limit directive of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryConstraint {
    Where {
        field: String,
        op: FilterOp,
        value: Value,
    },
    OrderBy {
        field: String,
        direction: Direction,
    },
    Limit(u32),
}

impl QueryConstraint {
    #[must_use]
    pub fn filter(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self::Where {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn where_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::filter(field, FilterOp::Equal, value)
    }

    #[must_use]
    pub fn order_by(field: impl Into<String>, direction: Direction) -> Self {
        Self::OrderBy {
            field: field.into(),
            direction,
        }
    }

    #[must_use]
    pub const fn limit(count: u32) -> Self {
        Self::Limit(count)
    }
}

/// Build the `structuredQuery` for `constraints` over one collection.
///
/// Several `Where` constraints are combined with AND; sort order follows
/// the order of the `OrderBy` constraints; the last `Limit` wins.
pub(crate) fn structured_query(collection_id: &str, constraints: &[QueryConstraint]) -> Value {
    let mut filters = Vec::new();
    let mut order_by = Vec::new();
    let mut limit = None;

    for constraint in constraints {
        match constraint {
            QueryConstraint::Where { field, op, value } => filters.push(field_filter(field, *op, value)),
            QueryConstraint::OrderBy { field, direction } => order_by.push(json!({
                "field": { "fieldPath": field_path(field) },
                "direction": direction.wire_name(),
            })),
            QueryConstraint::Limit(count) => limit = Some(*count),
        }
    }

    let mut query = json!({ "from": [{ "collectionId": collection_id }] });
    let where_clause = match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(json!({
            "compositeFilter": { "op": "AND", "filters": filters }
        })),
    };
    if let Some(where_clause) = where_clause {
        query["where"] = where_clause;
    }
    if !order_by.is_empty() {
        query["orderBy"] = Value::Array(order_by);
    }
    if let Some(limit) = limit {
        query["limit"] = json!(limit);
    }

    json!({ "structuredQuery": query })
}

fn field_filter(field: &str, op: FilterOp, value: &Value) -> Value {
    // Equality against null is a unary filter on the wire
    let unary = match (op, value) {
        (FilterOp::Equal, Value::Null) => Some("IS_NULL"),
        (FilterOp::NotEqual, Value::Null) => Some("IS_NOT_NULL"),
        _ => None,
    };
    if let Some(unary) = unary {
        return json!({
            "unaryFilter": { "op": unary, "field": { "fieldPath": field_path(field) } }
        });
    }

    json!({
        "fieldFilter": {
            "field": { "fieldPath": field_path(field) },
            "op": op.wire_name(),
            "value": encode(value),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_op_symbols_parse() {
        let ops = [
            FilterOp::Equal,
            FilterOp::NotEqual,
            FilterOp::LessThan,
            FilterOp::LessThanOrEqual,
            FilterOp::GreaterThan,
            FilterOp::GreaterThanOrEqual,
            FilterOp::ArrayContains,
            FilterOp::In,
            FilterOp::ArrayContainsAny,
            FilterOp::NotIn,
        ];
        for op in ops {
            assert_eq!(op.symbol().parse::<FilterOp>().unwrap(), op);
        }
        assert!("=~".parse::<FilterOp>().is_err());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Asc);
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
        assert_eq!(Direction::default(), Direction::Asc);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_empty_constraints() {
        assert_eq!(
            structured_query("products", &[]),
            json!({"structuredQuery": {"from": [{"collectionId": "products"}]}})
        );
    }

    #[test]
    fn test_single_where() {
        let query = structured_query("products", &[QueryConstraint::where_eq("category", "Toys")]);
        assert_eq!(
            query["structuredQuery"]["where"],
            json!({"fieldFilter": {
                "field": {"fieldPath": "category"},
                "op": "EQUAL",
                "value": {"stringValue": "Toys"}
            }})
        );
    }

    #[test]
    fn test_multiple_wheres_are_anded() {
        let query = structured_query(
            "products",
            &[
                QueryConstraint::where_eq("category", "Toys"),
                QueryConstraint::filter("stock", FilterOp::GreaterThan, 0),
            ],
        );
        let composite = &query["structuredQuery"]["where"]["compositeFilter"];
        assert_eq!(composite["op"], "AND");
        assert_eq!(composite["filters"].as_array().unwrap().len(), 2);
        assert_eq!(composite["filters"][1]["fieldFilter"]["op"], "GREATER_THAN");
        assert_eq!(
            composite["filters"][1]["fieldFilter"]["value"],
            json!({"integerValue": "0"})
        );
    }

    #[test]
    fn test_order_and_last_limit_wins() {
        let query = structured_query(
            "orders",
            &[
                QueryConstraint::order_by("createdAt", Direction::Desc),
                QueryConstraint::limit(50),
                QueryConstraint::order_by("total", Direction::Asc),
                QueryConstraint::limit(5),
            ],
        );
        let inner = &query["structuredQuery"];
        assert_eq!(
            inner["orderBy"],
            json!([
                {"field": {"fieldPath": "createdAt"}, "direction": "DESCENDING"},
                {"field": {"fieldPath": "total"}, "direction": "ASCENDING"}
            ])
        );
        assert_eq!(inner["limit"], 5);
    }

    #[test]
    fn test_null_equality_is_unary() {
        let query = structured_query("users", &[QueryConstraint::where_eq("photoURL", Value::Null)]);
        assert_eq!(
            query["structuredQuery"]["where"],
            json!({"unaryFilter": {"op": "IS_NULL", "field": {"fieldPath": "photoURL"}}})
        );
    }

    #[test]
    fn test_in_filter_encodes_array() {
        let query = structured_query(
            "orders",
            &[QueryConstraint::filter(
                "status",
                FilterOp::In,
                json!(["pending", "processing"]),
            )],
        );
        assert_eq!(
            query["structuredQuery"]["where"]["fieldFilter"]["value"],
            json!({"arrayValue": {"values": [
                {"stringValue": "pending"},
                {"stringValue": "processing"}
            ]}})
        );
    }

    #[test]
    fn test_field_paths_are_quoted() {
        let query = structured_query(
            "users",
            &[
                QueryConstraint::where_eq("first-name", "Shuna"),
                QueryConstraint::where_eq("shippingAddress.city", "Rimuru City"),
                QueryConstraint::order_by("last-seen", Direction::Desc),
            ],
        );
        let inner = &query["structuredQuery"];
        let filters = &inner["where"]["compositeFilter"]["filters"];
        assert_eq!(filters[0]["fieldFilter"]["field"]["fieldPath"], "`first-name`");
        assert_eq!(
            filters[1]["fieldFilter"]["field"]["fieldPath"],
            "shippingAddress.city"
        );
        assert_eq!(inner["orderBy"][0]["field"]["fieldPath"], "`last-seen`");
    }
}
