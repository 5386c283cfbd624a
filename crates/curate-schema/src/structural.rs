//! # Structural Validator
//!
//! Audits a metadata record against a JSON-Schema-style description
//! (`properties`, `required`, nested `properties`, `type`, `items`,
//! `enum`) and reports every defect. This is the QA path: it never
//! rejects anything, it returns a [`QaReport`].
//!
//! Unlike [`CompiledModel::construct`](crate::CompiledModel::construct),
//! keys present in the metadata but not declared by the schema are
//! ignored. The two paths are kept as distinct modes: construction is
//! strict about the record's shape, the audit only checks what the schema
//! declares.
//!
//! Canonical records store `null` for every absent optional field.
//! [`validate_canonical`](StructuralValidator::validate_canonical) reads
//! those nulls as absent, so a required object left out of the source
//! file is reported as missing rather than as a `null` of the wrong type.
//!
//! ## Array items
//!
//! Each item of an `array` property is audited against `items` on its
//! own, and a defect is reported on the item's indexed path
//! (`tags[1]: expected string, but got integer`). This differs from
//! the single array-level message of the Python QA tool this format
//! descends from.
//!
//! ## Supported `type` tokens
//!
//! | Token                           | Accepts                                 |
//! |---------------------------------|-----------------------------------------|
//! | `string`                        | string, enum member, timestamp          |
//! | `integer`                       | integer                                 |
//! | `number`                        | integer or float                        |
//! | `boolean`                       | boolean                                 |
//! | `null`                          | null                                    |
//! | `object`                        | mapping                                 |
//! | `array`                         | list; each item audited against `items` |
//! | `path`, `pathlib.Path`          | string or path                          |
//! | built-in enum name              | string or enum member of that set       |
//!
//! `type` may also be a list of tokens, any of which may match. An unknown
//! token never matches. A property without `type` or `properties` is not
//! checked.

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use curate_core::{load_document, to_json, EnumSet, FieldValue, Record};

use crate::compiler::json_type;
use crate::error::InvocationError;
use crate::path::FieldPath;
use crate::walk::{self, Visit};

/// Outcome of a structural audit: every defect, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QaReport {
    errors: Vec<String>,
}

impl QaReport {
    /// Whether no defect was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The defects.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consume the report, returning the defects.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

impl fmt::Display for QaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("Validation passed!");
        }
        f.write_str("Validation failed with errors:")?;
        for error in &self.errors {
            write!(f, "\n- {error}")?;
        }
        Ok(())
    }
}

/// Audits records against a JSON-Schema-style description.
#[derive(Debug, Clone)]
pub struct StructuralValidator {
    schema: Map<String, Value>,
}

impl StructuralValidator {
    /// Wrap a schema description.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::NotAnObject`] if `schema` is not a mapping.
    pub fn new(schema: Value) -> Result<Self, InvocationError> {
        match schema {
            Value::Object(schema) => Ok(Self { schema }),
            other => Err(InvocationError::NotAnObject {
                what: "schema",
                found: json_type(&other),
            }),
        }
    }

    /// Load a schema description from a JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::Document`] if the file cannot be loaded,
    /// or [`InvocationError::NotAnObject`] if it is not a mapping.
    pub fn from_file(path: &Path) -> Result<Self, InvocationError> {
        Self::new(load_document(path)?)
    }

    /// The wrapped schema.
    pub fn schema(&self) -> &Map<String, Value> {
        &self.schema
    }

    /// Audit a metadata value.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::NotAnObject`] if `metadata` is not a
    /// mapping. Every other problem goes into the report.
    pub fn validate(&self, metadata: &FieldValue) -> Result<QaReport, InvocationError> {
        match metadata {
            FieldValue::Map(record) => Ok(self.validate_record(record)),
            other => Err(InvocationError::NotAnObject {
                what: "metadata",
                found: other.type_name(),
            }),
        }
    }

    /// Audit raw JSON metadata.
    ///
    /// # Errors
    ///
    /// As [`validate`](Self::validate).
    pub fn validate_json(&self, metadata: &Value) -> Result<QaReport, InvocationError> {
        self.validate(&FieldValue::from(metadata))
    }

    /// Audit a record. Never fails.
    pub fn validate_record(&self, record: &Record) -> QaReport {
        let mut errors = Vec::new();
        check_object(record, &self.schema, &FieldPath::root(), &mut errors);
        tracing::debug!(errors = errors.len(), "structural audit complete");
        QaReport { errors }
    }

    /// Audit a canonical record, treating `null` fields as absent.
    pub fn validate_canonical(&self, record: &Record) -> QaReport {
        self.validate_record(&without_nulls(record))
    }
}

/// `record` minus its `null` entries, recursively through nested maps.
fn without_nulls(record: &Record) -> Record {
    record
        .iter()
        .filter_map(|(key, value)| match value {
            FieldValue::Null => None,
            FieldValue::Map(nested) => Some((key.clone(), FieldValue::Map(without_nulls(nested)))),
            other => Some((key.clone(), other.clone())),
        })
        .collect()
}

fn check_object(
    record: &Record,
    schema: &Map<String, Value>,
    path: &FieldPath,
    errors: &mut Vec<String>,
) {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let empty = Map::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    walk::descend(
        record,
        path,
        &required,
        properties.iter().map(|(name, spec)| (name.as_str(), spec)),
        |visit| match visit {
            Visit::Missing { path } => errors.push(format!("Missing required field: {path}")),
            Visit::Present {
                path, spec, value, ..
            } => check_property(value, spec, &path, errors),
            Visit::Absent { .. } | Visit::Undeclared { .. } => {}
        },
    );
}

fn check_property(value: &FieldValue, spec: &Value, path: &FieldPath, errors: &mut Vec<String>) {
    let Some(spec) = spec.as_object() else {
        return;
    };

    if let Some(Value::Object(_)) = spec.get("properties") {
        match value {
            FieldValue::Map(nested) => check_object(nested, spec, path, errors),
            FieldValue::Null if spec.get("type").is_some_and(|t| declares(t, "null")) => {}
            other => errors.push(format!(
                "Incorrect type for {path}: expected object, but got {}",
                other.type_name()
            )),
        }
        return;
    }

    let Some(declared) = spec.get("type") else {
        return;
    };

    if let (FieldValue::List(items), true) = (value, declares(declared, "array")) {
        if let Some(item_spec) = spec.get("items") {
            for (item_path, item) in walk::items(items, path) {
                check_property(item, item_spec, &item_path, errors);
            }
        }
        return;
    }

    if conforms(value, spec) {
        return;
    }

    match allowed_values(spec) {
        Some(allowed) => errors.push(format!(
            "Incorrect value for {path}: allowed values are {}, but got {}",
            render_list(&allowed),
            value.repr()
        )),
        None => errors.push(format!(
            "Incorrect type for {path}: expected {}, but got {}",
            render_type(declared),
            value.type_name()
        )),
    }
}

/// Whether `value` satisfies a leaf property schema.
fn conforms(value: &FieldValue, spec: &Map<String, Value>) -> bool {
    let type_ok = match spec.get("type") {
        None => true,
        Some(Value::String(token)) => matches_token(value, token),
        Some(Value::Array(tokens)) => tokens
            .iter()
            .filter_map(Value::as_str)
            .any(|token| matches_token(value, token)),
        Some(_) => false,
    };
    if !type_ok {
        return false;
    }
    match spec.get("enum").and_then(Value::as_array) {
        Some(members) => members.contains(&to_json(value)),
        None => true,
    }
}

fn declares(declared: &Value, token: &str) -> bool {
    match declared {
        Value::String(t) => t == token,
        Value::Array(tokens) => tokens.iter().any(|t| t.as_str() == Some(token)),
        _ => false,
    }
}

fn matches_token(value: &FieldValue, token: &str) -> bool {
    match (token, value) {
        ("string", FieldValue::String(_) | FieldValue::Enum(_) | FieldValue::DateTime(_)) => true,
        ("integer", FieldValue::Int(_)) => true,
        ("number", FieldValue::Int(_) | FieldValue::Float(_)) => true,
        ("boolean", FieldValue::Bool(_)) => true,
        ("null", FieldValue::Null) => true,
        ("object", FieldValue::Map(_)) => true,
        ("path" | "pathlib.Path", FieldValue::String(_) | FieldValue::Path(_)) => true,
        ("array", FieldValue::List(_)) => true,
        (name, FieldValue::String(raw)) => {
            EnumSet::builtin(name).is_some_and(|set| set.has_value(raw))
        }
        (name, FieldValue::Enum(member)) => {
            member.type_name == name && EnumSet::builtin(name).is_some_and(|set| set.has_value(&member.value))
        }
        _ => false,
    }
}

/// Permitted values for the enum-style diagnostic: the explicit `enum`
/// list, or the members of a built-in enum type.
fn allowed_values(spec: &Map<String, Value>) -> Option<Vec<String>> {
    if let Some(members) = spec.get("enum").and_then(Value::as_array) {
        return Some(
            members
                .iter()
                .map(|m| match m {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        );
    }
    spec.get("type")
        .and_then(Value::as_str)
        .and_then(EnumSet::builtin)
        .map(|set| set.values().into_iter().map(str::to_string).collect())
}

fn render_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    format!("[{}]", quoted.join(", "))
}

fn render_type(declared: &Value) -> String {
    match declared {
        Value::String(token) => token.clone(),
        Value::Array(tokens) => tokens
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" | "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn audit(schema: Value, metadata: Value) -> Vec<String> {
        StructuralValidator::new(schema)
            .unwrap()
            .validate_json(&metadata)
            .unwrap()
            .into_errors()
    }

    #[test]
    fn test_missing_required() {
        let errors = audit(json!({"required": ["title"], "properties": {}}), json!({}));
        assert_eq!(errors, vec!["Missing required field: title"]);
    }

    #[test]
    fn test_nested_missing_uses_dotted_path() {
        let schema = json!({
            "properties": {
                "contact": {
                    "required": ["name", "email"],
                    "properties": {"name": {"type": "string"}, "email": {"type": "string"}}
                }
            }
        });
        let errors = audit(schema, json!({"contact": {"name": "X"}}));
        assert_eq!(errors, vec!["Missing required field: contact.email"]);
    }

    #[test]
    fn test_type_mismatch_message() {
        let schema = json!({"properties": {"size": {"type": "integer"}}});
        let errors = audit(schema, json!({"size": "big"}));
        assert_eq!(errors, vec!["Incorrect type for size: expected integer, but got string"]);
    }

    #[test]
    fn test_enum_message_lists_allowed() {
        let schema = json!({"properties": {"type": {"type": "string", "enum": ["static", "filterable"]}}});
        let errors = audit(schema, json!({"type": "bogus"}));
        assert_eq!(
            errors,
            vec![r#"Incorrect value for type: allowed values are ["static", "filterable"], but got 'bogus'"#]
        );
    }

    #[test]
    fn test_builtin_enum_type() {
        let schema = json!({"properties": {"type": {"type": "DatasetType"}}});
        assert!(audit(schema.clone(), json!({"type": "static"})).is_empty());
        let errors = audit(schema, json!({"type": "bogus"}));
        assert!(errors[0].starts_with("Incorrect value for type: allowed values are [\"filterable\""));
    }

    #[test]
    fn test_array_items_checked() {
        let schema = json!({"properties": {"tags": {"type": "array", "items": {"type": "string"}}}});
        assert!(audit(schema.clone(), json!({"tags": ["a", "b"]})).is_empty());
        let errors = audit(schema, json!({"tags": ["a", 7]}));
        assert_eq!(errors, vec!["Incorrect type for tags[1]: expected string, but got integer"]);
    }

    #[test]
    fn test_array_of_objects_audited_per_item() {
        let schema = json!({
            "properties": {
                "notes": {
                    "type": "array",
                    "items": {"required": ["title"], "properties": {"title": {"type": "string"}}}
                }
            }
        });
        let errors = audit(schema, json!({"notes": [{"title": "a"}, {}]}));
        assert_eq!(errors, vec!["Missing required field: notes[1].title"]);
    }

    #[test]
    fn test_array_without_items_is_unconstrained() {
        let schema = json!({"properties": {"tags": {"type": "array"}}});
        assert!(audit(schema, json!({"tags": [1, "x", null]})).is_empty());
    }

    #[test]
    fn test_unknown_type_never_matches() {
        let schema = json!({"properties": {"x": {"type": "decimal"}}});
        let errors = audit(schema, json!({"x": 1}));
        assert_eq!(errors, vec!["Incorrect type for x: expected decimal, but got integer"]);
    }

    #[test]
    fn test_untyped_property_not_checked() {
        let schema = json!({"properties": {"x": {"description": "anything"}}});
        assert!(audit(schema, json!({"x": [1, 2]})).is_empty());
    }

    #[test]
    fn test_undeclared_keys_ignored() {
        let schema = json!({"properties": {"title": {"type": "string"}}});
        assert!(audit(schema, json!({"title": "X", "extra": 1})).is_empty());
    }

    #[test]
    fn test_path_type() {
        let schema = json!({"properties": {"file": {"type": "pathlib.Path"}}});
        assert!(audit(schema.clone(), json!({"file": "data.csv"})).is_empty());
        assert_eq!(audit(schema, json!({"file": 3})).len(), 1);
    }

    #[test]
    fn test_type_union() {
        let schema = json!({"properties": {"v": {"type": ["integer", "null"]}}});
        assert!(audit(schema.clone(), json!({"v": null})).is_empty());
        let errors = audit(schema, json!({"v": "x"}));
        assert_eq!(errors, vec!["Incorrect type for v: expected integer | null, but got string"]);
    }

    #[test]
    fn test_nullable_nested_object() {
        let schema = json!({"properties": {"file": {"type": ["object", "null"], "properties": {}}}});
        assert!(audit(schema, json!({"file": null})).is_empty());
    }

    #[test]
    fn test_nested_non_object() {
        let schema = json!({"properties": {"contact": {"properties": {}}}});
        let errors = audit(schema, json!({"contact": "x"}));
        assert_eq!(errors, vec!["Incorrect type for contact: expected object, but got string"]);
    }

    #[test]
    fn test_every_defect_reported() {
        let schema = json!({
            "required": ["id", "title"],
            "properties": {"id": {"type": "string"}, "size": {"type": "integer"}, "tags": {"type": "array"}}
        });
        let errors = audit(schema, json!({"size": 1.5, "tags": "x"}));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_non_object_inputs_are_invocation_errors() {
        assert!(matches!(
            StructuralValidator::new(json!([])),
            Err(InvocationError::NotAnObject { what: "schema", .. })
        ));
        let v = StructuralValidator::new(json!({})).unwrap();
        assert!(matches!(
            v.validate_json(&json!("x")),
            Err(InvocationError::NotAnObject { what: "metadata", .. })
        ));
    }

    #[test]
    fn test_canonical_nulls_read_as_absent() {
        let schema = json!({
            "required": ["title", "contact"],
            "properties": {
                "title": {"type": "string"},
                "contact": {
                    "required": ["name"],
                    "properties": {"name": {"type": "string"}, "email": {"type": "string"}}
                }
            }
        });
        let validator = StructuralValidator::new(schema).unwrap();
        let FieldValue::Map(record) =
            FieldValue::from(json!({"title": "T", "contact": null}))
        else {
            panic!("expected a map");
        };
        assert_eq!(
            validator.validate_record(&record).into_errors(),
            vec!["Incorrect type for contact: expected object, but got null"]
        );
        assert_eq!(
            validator.validate_canonical(&record).into_errors(),
            vec!["Missing required field: contact"]
        );

        let FieldValue::Map(record) =
            FieldValue::from(json!({"title": "T", "contact": {"name": null, "email": null}}))
        else {
            panic!("expected a map");
        };
        assert_eq!(
            validator.validate_canonical(&record).into_errors(),
            vec!["Missing required field: contact.name"]
        );
    }

    #[test]
    fn test_report_display() {
        assert_eq!(QaReport::default().to_string(), "Validation passed!");
        let report = QaReport {
            errors: vec!["a".into(), "b".into()],
        };
        assert_eq!(report.to_string(), "Validation failed with errors:\n- a\n- b");
    }
}
