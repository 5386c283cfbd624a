//! # Dynamic Field Values
//!
//! A metadata record is a tree of primitive values and nested maps whose
//! shape is only known at runtime, from a schema description. `FieldValue`
//! is that tree. Raw input arrives as `serde_json::Value` and is lifted
//! into a `FieldValue` with [`FieldValue::from`]; validated output keeps
//! richer variants (`DateTime`, `Enum`, `Path`, `Bytes`) that the
//! [`serialize`](crate::serialize) bridge lowers back to JSON primitives.
//!
//! Maps are `BTreeMap`s so that the canonical representation of a record
//! is independent of input key order.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::temporal::Timestamp;

/// Canonical field map: field name to value.
pub type Record = BTreeMap<String, FieldValue>;

/// A resolved member of a closed enumerated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Name of the enumerated type (e.g. `DatasetType`).
    pub type_name: String,
    /// Member name (e.g. `STATIC`).
    pub name: String,
    /// Member value as it appears in documents (e.g. `static`).
    pub value: String,
}

/// A dynamically-typed metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent or explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// UTC timestamp.
    DateTime(Timestamp),
    /// Member of a closed enumerated type.
    Enum(EnumValue),
    /// Filesystem path.
    Path(PathBuf),
    /// Raw byte content.
    Bytes(Vec<u8>),
    /// Homogeneous sequence.
    List(Vec<FieldValue>),
    /// Nested field map.
    Map(Record),
}

impl FieldValue {
    /// Short name of the value's runtime type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Enum(_) => "enum",
            Self::Path(_) => "path",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "array",
            Self::Map(_) => "object",
        }
    }

    /// Whether the value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string content of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the nested map of a `Map` value.
    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow the items of a `List` value.
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a field by dotted path (`contact.email`) through nested maps.
    pub fn lookup(&self, dotted: &str) -> Option<&FieldValue> {
        dotted
            .split('.')
            .try_fold(self, |current, segment| current.as_map()?.get(segment))
    }

    /// Short human-readable rendering used in error messages.
    pub fn repr(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("'{s}'"),
            Self::DateTime(ts) => ts.to_iso8601(),
            Self::Enum(e) => format!("'{}'", e.value),
            Self::Path(p) => format!("'{}'", p.display()),
            Self::Bytes(b) => format!("<{} bytes>", b.len()),
            Self::List(items) => format!("<array of {}>", items.len()),
            Self::Map(m) => format!("<object with {} fields>", m.len()),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                // u64 above i64::MAX and all non-integers widen to f64.
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<PathBuf> for FieldValue {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(ts: Timestamp) -> Self {
        Self::DateTime(ts)
    }
}

impl From<Record> for FieldValue {
    fn from(map: Record) -> Self {
        Self::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object_nests_maps_and_lists() {
        let v = FieldValue::from(json!({
            "title": "Population",
            "version": 3,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "contact": {"name": "X"}
        }));
        let map = v.as_map().unwrap();
        assert_eq!(map["title"], FieldValue::String("Population".into()));
        assert_eq!(map["version"], FieldValue::Int(3));
        assert_eq!(map["ratio"], FieldValue::Float(0.5));
        assert_eq!(map["tags"].as_list().unwrap().len(), 2);
        assert_eq!(v.lookup("contact.name"), Some(&FieldValue::String("X".into())));
    }

    #[test]
    fn test_large_unsigned_widens_to_float() {
        let v = FieldValue::from(json!(u64::MAX));
        assert!(matches!(v, FieldValue::Float(_)));
    }

    #[test]
    fn test_lookup_missing_segment_is_none() {
        let v = FieldValue::from(json!({"contact": {"name": "X"}}));
        assert!(v.lookup("contact.email").is_none());
        assert!(v.lookup("contact.name.first").is_none());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FieldValue::Null.type_name(), "null");
        assert_eq!(FieldValue::Int(1).type_name(), "integer");
        assert_eq!(FieldValue::String(String::new()).type_name(), "string");
        assert_eq!(FieldValue::Path(PathBuf::from("a")).type_name(), "path");
        assert_eq!(FieldValue::Map(Record::new()).type_name(), "object");
    }

    #[test]
    fn test_repr_quotes_strings() {
        assert_eq!(FieldValue::from("bogus").repr(), "'bogus'");
        assert_eq!(FieldValue::Int(7).repr(), "7");
    }
}
