//! Field paths for update masks and query constraints.
//!
//! A dot separates nested fields: `shippingAddress.city` names the `city`
//! field inside the `shippingAddress` map. Segments that are not plain
//! identifiers are backtick-quoted on the wire.

use serde_json::{Map, Value};

use super::DocumentData;
use crate::platform::error::PlatformFailure;

/// Wire form of a dotted field path, each segment quoted as needed.
pub(crate) fn field_path(path: &str) -> String {
    path.split('.').map(quote_segment).collect::<Vec<_>>().join(".")
}

fn quote_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        return segment.to_string();
    }

    let escaped = segment.replace('\\', "\\\\").replace('`', "\\`");
    format!("`{escaped}`")
}

/// Expand dotted keys of an update into nested maps.
///
/// `{"shippingAddress.city": "Rimuru City"}` becomes
/// `{"shippingAddress": {"city": "Rimuru City"}}`. A path given twice, or
/// one path nested under another, is rejected.
pub(crate) fn nest_fields(partial: &DocumentData) -> Result<DocumentData, PlatformFailure> {
    let mut nested = Map::new();

    for (key, value) in partial {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(PlatformFailure::InvalidInput(format!(
                "invalid field path: {key:?}"
            )));
        }
        let overlaps = partial.keys().any(|other| {
            key.strip_prefix(other.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
        });
        if overlaps {
            return Err(conflict(key));
        }
        let Some((leaf, parents)) = segments.split_last() else {
            continue;
        };

        let mut node = &mut nested;
        for parent in parents {
            let child = node
                .entry((*parent).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match child {
                Value::Object(map) => map,
                _ => return Err(conflict(key)),
            };
        }
        if node.contains_key(*leaf) {
            return Err(conflict(key));
        }
        node.insert((*leaf).to_string(), value.clone());
    }

    Ok(nested)
}

fn conflict(key: &str) -> PlatformFailure {
    PlatformFailure::InvalidInput(format!("field path {key:?} overlaps another field"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_field_path_quotes_each_segment() {
        assert_eq!(field_path("stock"), "stock");
        assert_eq!(field_path("_private1"), "_private1");
        assert_eq!(field_path("shippingAddress.city"), "shippingAddress.city");
        assert_eq!(field_path("first-name"), "`first-name`");
        assert_eq!(field_path("meta.1st"), "meta.`1st`");
        assert_eq!(field_path("a`b"), "`a\\`b`");
    }

    #[test]
    fn test_nest_fields() {
        let nested = nest_fields(&data(json!({
            "shippingAddress.city": "Rimuru City",
            "shippingAddress.zipCode": "12345",
            "status": "shipped"
        })))
        .unwrap();
        assert_eq!(
            Value::Object(nested),
            json!({
                "shippingAddress": {"city": "Rimuru City", "zipCode": "12345"},
                "status": "shipped"
            })
        );
    }

    #[test]
    fn test_nest_fields_rejects_overlap() {
        let err = nest_fields(&data(json!({
            "shippingAddress": {"street": "1 Main St"},
            "shippingAddress.city": "Rimuru City"
        })))
        .unwrap_err();
        assert!(matches!(err, PlatformFailure::InvalidInput(_)));
    }

    #[test]
    fn test_nest_fields_rejects_empty_segment() {
        let err = nest_fields(&data(json!({"a..b": 1}))).unwrap_err();
        assert!(matches!(err, PlatformFailure::InvalidInput(_)));
    }
}
