//! Conversion between plain JSON and the document store's typed values.
//!
//! The REST surface wraps every value in a single-key object naming its
//! type, e.g. `{"integerValue": "3"}` or `{"mapValue": {"fields": {...}}}`.

use serde_json::{Map, Number, Value};

use super::super::error::PlatformFailure;

/// Encode a JSON value as a typed document value.
pub fn encode(value: &Value) -> Value {
    let mut typed = Map::with_capacity(1);
    let (key, inner) = match value {
        Value::Null => ("nullValue", Value::Null),
        Value::Bool(b) => ("booleanValue", Value::Bool(*b)),
        Value::Number(n) => encode_number(n),
        Value::String(s) => ("stringValue", Value::String(s.clone())),
        Value::Array(items) => {
            let values = items.iter().map(encode).collect();
            ("arrayValue", single("values", Value::Array(values)))
        }
        Value::Object(map) => ("mapValue", single("fields", Value::Object(encode_fields(map)))),
    };
    typed.insert(key.to_string(), inner);
    Value::Object(typed)
}

/// Encode every field of a document.
pub fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), encode(value)))
        .collect()
}

/// Decode a typed document value back into plain JSON.
///
/// Timestamps, references and bytes come back as strings.
///
/// # Errors
///
/// Returns `PlatformFailure::Unexpected` for anything that is not a typed
/// value this codec understands.
pub fn decode(value: &Value) -> Result<Value, PlatformFailure> {
    let Some(typed) = value.as_object() else {
        return Err(unexpected("typed value must be an object", value));
    };
    let Some((kind, inner)) = typed.iter().next() else {
        return Err(unexpected("typed value is empty", value));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| unexpected("booleanValue", inner)),
        "integerValue" => decode_integer(inner),
        "doubleValue" => decode_double(inner),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| unexpected(kind, inner)),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => match inner.get("values") {
            None => Ok(Value::Array(Vec::new())),
            Some(Value::Array(values)) => {
                values.iter().map(decode).collect::<Result<_, _>>().map(Value::Array)
            }
            Some(other) => Err(unexpected("arrayValue.values", other)),
        },
        "mapValue" => match inner.get("fields") {
            None => Ok(Value::Object(Map::new())),
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            Some(other) => Err(unexpected("mapValue.fields", other)),
        },
        other => Err(PlatformFailure::Unexpected(format!(
            "unsupported value type {other}"
        ))),
    }
}

/// Decode every field of a document.
///
/// # Errors
///
/// Fails on the first field [`decode`] rejects.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, PlatformFailure> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode(value)?)))
        .collect()
}

fn encode_number(n: &Number) -> (&'static str, Value) {
    // Integers travel as decimal strings; anything outside i64 is a double
    if let Some(i) = n.as_i64() {
        return ("integerValue", Value::String(i.to_string()));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .map_or(("nullValue", Value::Null), |f| {
            ("doubleValue", Value::Number(f))
        })
}

fn decode_integer(inner: &Value) -> Result<Value, PlatformFailure> {
    let parsed = match inner {
        Value::String(s) => s.parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed
        .map(|i| Value::Number(i.into()))
        .ok_or_else(|| unexpected("integerValue", inner))
}

fn decode_double(inner: &Value) -> Result<Value, PlatformFailure> {
    let parsed = match inner {
        Value::Number(n) => n.as_f64(),
        // NaN and the infinities arrive as strings
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    let Some(f) = parsed else {
        return Err(unexpected("doubleValue", inner));
    };
    // JSON has no NaN or infinity
    Ok(Number::from_f64(f).map_or(Value::Null, Value::Number))
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn unexpected(what: &str, value: &Value) -> PlatformFailure {
    PlatformFailure::Unexpected(format!("malformed {what}: {value}"))
}
