//! # Compiled Models
//!
//! A [`CompiledModel`] is the field-type tree produced by the
//! [`ModelCompiler`](crate::ModelCompiler) from a schema description. It
//! holds no generated types: [`CompiledModel::construct`] interprets the
//! tree against a record, dispatching on [`FieldKind`].
//!
//! ## Construction rules
//!
//! - Coercion is strict. A string is never parsed into a number and a
//!   number is never stringified. The only widening is integer to `float`.
//! - `datetime` accepts a timestamp value or an ISO-8601 string and
//!   normalizes to UTC.
//! - `enum` accepts a member value (exact match) or an already-resolved
//!   member of the same set, and normalizes to the resolved member.
//! - An absent optional field becomes `null`; an absent defaulted field
//!   takes its default. Every declared field appears in the output.
//! - A key the model does not declare is rejected.
//! - Every failure is collected; the first one does not stop the walk.
//!
//! Because the output uses only canonical variants, constructing an
//! already-constructed record yields the same record.

use std::sync::Arc;

use curate_core::{EnumSet, FieldValue, Record, Timestamp};

use crate::error::{FieldError, FieldErrorKind, ValidationError};
use crate::path::FieldPath;
use crate::walk::{self, Visit};

/// Primitive field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 string.
    String,
    /// 64-bit signed integer.
    Int,
    /// Floating point number; integers widen.
    Float,
    /// Boolean.
    Bool,
    /// UTC timestamp.
    DateTime,
    /// Unchecked.
    Any,
}

impl ScalarType {
    /// Resolve a schema type token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "datetime" => Some(Self::DateTime),
            "any" => Some(Self::Any),
            _ => None,
        }
    }

    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "integer",
            Self::Float => "number",
            Self::Bool => "boolean",
            Self::DateTime => "datetime",
            Self::Any => "any",
        }
    }
}

/// The type of one field: a tagged variant over the four spec kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A primitive.
    Scalar(ScalarType),
    /// A member of a closed set.
    Enum(EnumSet),
    /// A homogeneous sequence.
    List(Box<FieldKind>),
    /// A nested model.
    Nested(Arc<CompiledModel>),
}

impl FieldKind {
    /// Short description used in type-mismatch diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Scalar(s) => s.name().to_string(),
            Self::Enum(set) => set.name().to_string(),
            Self::List(item) => format!("array of {}", item.describe()),
            Self::Nested(model) => format!("object ({})", model.name()),
        }
    }
}

/// How a field behaves when it is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Construction fails if the field is absent.
    Required,
    /// Absent means `null`.
    Optional,
    /// Absent means this (already normalized) value.
    Default(FieldValue),
}

impl Presence {
    /// Whether the field must be supplied.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    fn fallback(&self) -> FieldValue {
        match self {
            Self::Default(value) => value.clone(),
            Self::Required | Self::Optional => FieldValue::Null,
        }
    }
}

/// One declared field of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field type.
    pub kind: FieldKind,
    /// Absence behaviour.
    pub presence: Presence,
}

/// A validator and normalizer compiled from a schema description.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModel {
    name: String,
    fields: Vec<FieldDef>,
}

impl CompiledModel {
    pub(crate) fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// The model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in schema order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of declared fields in schema order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Validate a record and return its canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every missing required field,
    /// type mismatch, enum violation and undeclared key.
    pub fn construct(&self, data: &Record) -> Result<Record, ValidationError> {
        let mut errors = Vec::new();
        let out = self.normalize(data, &FieldPath::root(), &mut errors);
        if errors.is_empty() {
            tracing::trace!(model = %self.name, fields = out.len(), "constructed record");
            Ok(out)
        } else {
            tracing::debug!(model = %self.name, errors = errors.len(), "record rejected");
            Err(ValidationError {
                model: self.name.clone(),
                errors,
            })
        }
    }

    /// [`construct`](Self::construct) for raw JSON input.
    ///
    /// # Errors
    ///
    /// As `construct`; a non-object input is a type mismatch at the root.
    pub fn construct_json(&self, data: &serde_json::Value) -> Result<Record, ValidationError> {
        match FieldValue::from(data) {
            FieldValue::Map(record) => self.construct(&record),
            other => Err(ValidationError {
                model: self.name.clone(),
                errors: vec![FieldError {
                    path: FieldPath::root(),
                    kind: FieldErrorKind::TypeMismatch {
                        expected: "object".to_string(),
                        actual: other.type_name(),
                    },
                }],
            }),
        }
    }

    pub(crate) fn normalize(
        &self,
        input: &Record,
        path: &FieldPath,
        errors: &mut Vec<FieldError>,
    ) -> Record {
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.presence.is_required())
            .map(|f| f.name.as_str())
            .collect();

        let mut out = Record::new();
        walk::descend(
            input,
            path,
            &required,
            self.fields.iter().map(|f| (f.name.as_str(), f)),
            |visit| match visit {
                Visit::Missing { path } => errors.push(FieldError {
                    path,
                    kind: FieldErrorKind::Missing,
                }),
                Visit::Absent { name, spec } => {
                    out.insert(name.to_string(), spec.presence.fallback());
                }
                Visit::Present {
                    path,
                    name,
                    spec,
                    value,
                } => {
                    if value.is_null() && spec.presence == Presence::Optional {
                        out.insert(name.to_string(), FieldValue::Null);
                    } else if let Some(v) = coerce(&spec.kind, value, &path, errors) {
                        out.insert(name.to_string(), v);
                    }
                }
                Visit::Undeclared { path, .. } => errors.push(FieldError {
                    path,
                    kind: FieldErrorKind::UnknownField,
                }),
            },
        );
        out
    }
}

/// Coerce one value to `kind`, pushing failures onto `errors`.
///
/// Returns `None` if any failure was recorded for this value.
pub(crate) fn coerce(
    kind: &FieldKind,
    value: &FieldValue,
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) -> Option<FieldValue> {
    let mismatch = |errors: &mut Vec<FieldError>| -> Option<FieldValue> {
        errors.push(FieldError {
            path: path.clone(),
            kind: FieldErrorKind::TypeMismatch {
                expected: kind.describe(),
                actual: value.type_name(),
            },
        });
        None
    };

    match (kind, value) {
        (FieldKind::Scalar(ScalarType::Any), v) => Some(v.clone()),
        (FieldKind::Scalar(ScalarType::String), FieldValue::String(_))
        | (FieldKind::Scalar(ScalarType::Int), FieldValue::Int(_))
        | (FieldKind::Scalar(ScalarType::Float), FieldValue::Float(_))
        | (FieldKind::Scalar(ScalarType::Bool), FieldValue::Bool(_))
        | (FieldKind::Scalar(ScalarType::DateTime), FieldValue::DateTime(_)) => Some(value.clone()),
        (FieldKind::Scalar(ScalarType::Float), FieldValue::Int(n)) => Some(FieldValue::Float(*n as f64)),
        (FieldKind::Scalar(ScalarType::DateTime), FieldValue::String(s)) => match Timestamp::parse(s) {
            Ok(ts) => Some(FieldValue::DateTime(ts)),
            Err(e) => {
                errors.push(FieldError {
                    path: path.clone(),
                    kind: FieldErrorKind::InvalidDateTime {
                        reason: e.to_string(),
                    },
                });
                None
            }
        },
        (FieldKind::Enum(set), FieldValue::String(raw)) => resolve_member(set, raw, value, path, errors),
        (FieldKind::Enum(set), FieldValue::Enum(member)) if member.type_name == set.name() => {
            resolve_member(set, &member.value, value, path, errors)
        }
        (FieldKind::Enum(_), FieldValue::Null) => mismatch(errors),
        (FieldKind::Enum(set), other) => {
            errors.push(not_in_enum(set, other, path));
            None
        }
        (FieldKind::List(item_kind), FieldValue::List(items)) => {
            let before = errors.len();
            let out: Vec<FieldValue> = walk::items(items, path)
                .filter_map(|(item_path, item)| coerce(item_kind, item, &item_path, errors))
                .collect();
            (errors.len() == before).then_some(FieldValue::List(out))
        }
        (FieldKind::Nested(model), FieldValue::Map(record)) => {
            let before = errors.len();
            let out = model.normalize(record, path, errors);
            (errors.len() == before).then_some(FieldValue::Map(out))
        }
        _ => mismatch(errors),
    }
}

fn resolve_member(
    set: &EnumSet,
    raw: &str,
    original: &FieldValue,
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) -> Option<FieldValue> {
    match set.resolve(raw) {
        Some(member) => Some(FieldValue::Enum(member)),
        None => {
            errors.push(not_in_enum(set, original, path));
            None
        }
    }
}

fn not_in_enum(set: &EnumSet, value: &FieldValue, path: &FieldPath) -> FieldError {
    FieldError {
        path: path.clone(),
        kind: FieldErrorKind::NotInEnum {
            enum_name: set.name().to_string(),
            allowed: set.values().into_iter().map(str::to_string).collect(),
            actual: value.repr(),
        },
    }
}
