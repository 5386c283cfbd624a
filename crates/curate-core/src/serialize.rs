//! # Serialization Bridge
//!
//! Lowers a [`FieldValue`] tree to JSON-safe primitives for persistence
//! and export:
//!
//! | Internal           | JSON                                   |
//! |--------------------|----------------------------------------|
//! | `Enum`             | member value string                    |
//! | `DateTime`         | ISO-8601 string with `Z`               |
//! | `Path`             | path string (lossy UTF-8)              |
//! | `Bytes`            | UTF-8 text, or standard base64         |
//! | non-finite `Float` | its `Display` string                   |
//!
//! Nesting deeper than [`MAX_DEPTH`] is cut off with a
//! `<CircularRef: ...>` placeholder string instead of recursing further.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value};

use crate::error::CurateError;
use crate::value::{FieldValue, Record};

/// Maximum container nesting the bridge will descend into.
pub const MAX_DEPTH: usize = 64;

/// Lower a value to JSON-safe primitives.
pub fn to_json(value: &FieldValue) -> Value {
    lower(value, 0)
}

/// Lower a record (top-level field map) to a JSON object.
pub fn record_to_json(record: &Record) -> Value {
    Value::Object(lower_map(record, 0))
}

/// Render a record as pretty-printed JSON text.
///
/// # Errors
///
/// Returns [`CurateError::Serialization`] if the JSON writer fails.
pub fn to_json_pretty(record: &Record) -> Result<String, CurateError> {
    serde_json::to_string_pretty(&record_to_json(record))
        .map_err(|e| CurateError::Serialization(e.to_string()))
}

fn lower(value: &FieldValue, depth: usize) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(n) => Value::Number(Number::from(*n)),
        FieldValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::DateTime(ts) => Value::String(ts.to_iso8601()),
        FieldValue::Enum(e) => Value::String(e.value.clone()),
        FieldValue::Path(p) => Value::String(p.to_string_lossy().into_owned()),
        FieldValue::Bytes(bytes) => Value::String(decode_bytes(bytes)),
        FieldValue::List(items) => {
            if depth >= MAX_DEPTH {
                return placeholder(value);
            }
            Value::Array(items.iter().map(|v| lower(v, depth + 1)).collect())
        }
        FieldValue::Map(map) => {
            if depth >= MAX_DEPTH {
                return placeholder(value);
            }
            Value::Object(lower_map(map, depth + 1))
        }
    }
}

fn lower_map(map: &Record, depth: usize) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), lower(v, depth)))
        .collect()
}

fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => STANDARD.encode(bytes),
    }
}

fn placeholder(value: &FieldValue) -> Value {
    tracing::warn!(kind = value.type_name(), depth = MAX_DEPTH, "nesting limit reached during serialization");
    let kind = match value {
        FieldValue::List(_) => "list",
        _ => "map",
    };
    Value::String(format!("<CircularRef: {kind}>"))
}
