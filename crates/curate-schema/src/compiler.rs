//! # Model Compiler
//!
//! Translates a schema description into a [`CompiledModel`], post-order:
//! nested descriptions are compiled (and cached) before the model that
//! contains them.
//!
//! ## Field specifications
//!
//! | Spec                                   | Kind                         |
//! |----------------------------------------|------------------------------|
//! | non-mapping value `v`                  | `string`, default `v`        |
//! | mapping without `type`                 | nested model                 |
//! | `{type: dict, ...}`                    | nested model                 |
//! | `{type: list, items: <spec>}`          | list (items default string)  |
//! | `{type: enum, enum: [..] \| <Name>}`   | closed set                   |
//! | `{type: string\|int\|float\|bool\|datetime\|any}` | scalar            |
//!
//! In a nested description the keys `type`, `model_name`, `required`,
//! `default`, `description`, `auto` and `source` are attributes of the
//! field when their value is not a mapping; otherwise they name sub-fields.
//! `auto`, `source` and `description` are informational and ignored.
//!
//! A nested model is named `<Parent>_<Field>` (field name capitalized:
//! first letter upper, rest lower) unless it sets `model_name`; a nested
//! list item is named `<Parent>_<Field>Item`.
//!
//! ## Cache
//!
//! The compiler owns its cache. Compiling a name already in the cache
//! returns the cached model when the description is identical and fails
//! with [`ConfigurationError::ConflictingModel`] otherwise. The cache is
//! append-only; a fresh compiler starts empty. A failed compile adds
//! nothing: nested models compiled on the way are dropped with it.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use curate_core::{load_document, EnumSet, FieldValue};

use crate::error::ConfigurationError;
use crate::model::{coerce, CompiledModel, FieldDef, FieldKind, Presence, ScalarType};
use crate::path::FieldPath;

/// Keys that are field attributes rather than sub-fields when their value
/// is not a mapping.
const ATTRIBUTE_KEYS: &[&str] = &[
    "type",
    "model_name",
    "required",
    "default",
    "description",
    "auto",
    "source",
];

/// Compiles schema descriptions into cached models.
#[derive(Debug, Default)]
pub struct ModelCompiler {
    cache: HashMap<String, (Value, Arc<CompiledModel>)>,
}

impl ModelCompiler {
    /// A compiler with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a schema description under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for an unsupported type token, a
    /// malformed field spec, an unknown built-in enum, an invalid default,
    /// or a name already compiled with a different shape.
    pub fn compile(
        &mut self,
        name: &str,
        schema: &Value,
    ) -> Result<Arc<CompiledModel>, ConfigurationError> {
        let committed: HashSet<String> = self.cache.keys().cloned().collect();
        let result = self.compile_model(name, schema);
        if result.is_err() {
            self.cache.retain(|cached, _| committed.contains(cached));
        }
        result
    }

    fn compile_model(
        &mut self,
        name: &str,
        schema: &Value,
    ) -> Result<Arc<CompiledModel>, ConfigurationError> {
        if let Some((shape, model)) = self.cache.get(name) {
            if shape == schema {
                tracing::trace!(model = %name, "model cache hit");
                return Ok(Arc::clone(model));
            }
            return Err(ConfigurationError::ConflictingModel {
                name: name.to_string(),
            });
        }

        let fields = schema
            .as_object()
            .ok_or_else(|| ConfigurationError::NotAMapping {
                model: name.to_string(),
                found: json_type(schema),
            })?;

        let mut defs = Vec::with_capacity(fields.len());
        for (field, spec) in fields {
            defs.push(self.resolve_field(name, field, spec)?);
        }

        let model = Arc::new(CompiledModel::new(name, defs));
        self.cache
            .insert(name.to_string(), (schema.clone(), Arc::clone(&model)));
        tracing::debug!(model = %name, fields = model.fields().len(), "compiled model");
        Ok(model)
    }

    /// Load a JSON or YAML schema file and compile it under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Document`] if the file cannot be
    /// loaded, otherwise as [`compile`](Self::compile).
    pub fn compile_file(
        &mut self,
        name: &str,
        path: &Path,
    ) -> Result<Arc<CompiledModel>, ConfigurationError> {
        let schema = load_document(path)?;
        self.compile(name, &schema)
    }

    /// Number of cached models, nested ones included.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Whether a model of this name has been compiled.
    pub fn contains(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// A cached model by name.
    pub fn get(&self, name: &str) -> Option<Arc<CompiledModel>> {
        self.cache.get(name).map(|(_, model)| Arc::clone(model))
    }

    fn resolve_field(
        &mut self,
        model: &str,
        field: &str,
        spec: &Value,
    ) -> Result<FieldDef, ConfigurationError> {
        let location = format!("{model}.{field}");

        let Value::Object(spec) = spec else {
            // A bare value is a string field defaulting to that value.
            let kind = FieldKind::Scalar(ScalarType::String);
            let presence = default_presence(&kind, spec, &location)?;
            return Ok(FieldDef {
                name: field.to_string(),
                kind,
                presence,
            });
        };

        let nested_name = format!("{model}_{}", capitalize(field));
        let kind = self.resolve_kind(spec, nested_name, &location)?;

        let presence = match attribute(spec, "default") {
            Some(default) => default_presence(&kind, default, &location)?,
            None => match attribute(spec, "required") {
                None | Some(Value::Bool(false)) => Presence::Optional,
                Some(Value::Bool(true)) => Presence::Required,
                Some(other) => {
                    return Err(ConfigurationError::MalformedSpec {
                        field: location,
                        reason: format!("'required' must be a boolean, found {}", json_type(other)),
                    })
                }
            },
        };

        Ok(FieldDef {
            name: field.to_string(),
            kind,
            presence,
        })
    }

    fn resolve_kind(
        &mut self,
        spec: &Map<String, Value>,
        nested_name: String,
        location: &str,
    ) -> Result<FieldKind, ConfigurationError> {
        let token = match spec.get("type") {
            None | Some(Value::Object(_)) => return self.nested(spec, nested_name),
            Some(Value::String(token)) => token.as_str(),
            Some(other) => {
                return Err(ConfigurationError::MalformedSpec {
                    field: location.to_string(),
                    reason: format!("'type' must be a string, found {}", json_type(other)),
                })
            }
        };

        if let Some(scalar) = ScalarType::from_token(token) {
            return Ok(FieldKind::Scalar(scalar));
        }

        match token {
            "dict" => self.nested(spec, nested_name),
            "list" => {
                let item_name = format!("{nested_name}Item");
                let item = match spec.get("items") {
                    None => FieldKind::Scalar(ScalarType::String),
                    Some(Value::String(item_token)) => {
                        let mut shorthand = Map::new();
                        shorthand.insert("type".to_string(), Value::String(item_token.clone()));
                        self.resolve_kind(&shorthand, item_name, location)?
                    }
                    Some(Value::Object(item)) => self.resolve_kind(item, item_name, location)?,
                    Some(other) => {
                        return Err(ConfigurationError::MalformedSpec {
                            field: location.to_string(),
                            reason: format!("'items' must be a mapping, found {}", json_type(other)),
                        })
                    }
                };
                Ok(FieldKind::List(Box::new(item)))
            }
            "enum" => resolve_enum(spec.get("enum"), nested_name, location),
            other => Err(ConfigurationError::UnsupportedType {
                field: location.to_string(),
                type_token: other.to_string(),
            }),
        }
    }

    fn nested(
        &mut self,
        spec: &Map<String, Value>,
        default_name: String,
    ) -> Result<FieldKind, ConfigurationError> {
        let name = match spec.get("model_name") {
            Some(Value::String(explicit)) => explicit.clone(),
            _ => default_name,
        };
        let body: Map<String, Value> = spec
            .iter()
            .filter(|(key, value)| !is_attribute(key, value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let model = self.compile_model(&name, &Value::Object(body))?;
        Ok(FieldKind::Nested(model))
    }
}

fn resolve_enum(
    members: Option<&Value>,
    set_name: String,
    location: &str,
) -> Result<FieldKind, ConfigurationError> {
    match members {
        Some(Value::String(builtin)) => EnumSet::builtin(builtin)
            .map(FieldKind::Enum)
            .ok_or_else(|| ConfigurationError::UnknownEnum {
                field: location.to_string(),
                name: builtin.clone(),
            }),
        Some(Value::Array(values)) => {
            let mut strings = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::String(s) => strings.push(s.clone()),
                    other => {
                        return Err(ConfigurationError::MalformedSpec {
                            field: location.to_string(),
                            reason: format!("enum members must be strings, found {}", json_type(other)),
                        })
                    }
                }
            }
            if strings.is_empty() {
                return Err(ConfigurationError::MalformedSpec {
                    field: location.to_string(),
                    reason: "enum must declare at least one member".to_string(),
                });
            }
            Ok(FieldKind::Enum(EnumSet::from_values(set_name, strings)))
        }
        Some(other) => Err(ConfigurationError::MalformedSpec {
            field: location.to_string(),
            reason: format!(
                "'enum' must be a list of values or a built-in enum name, found {}",
                json_type(other)
            ),
        }),
        None => Err(ConfigurationError::MalformedSpec {
            field: location.to_string(),
            reason: "type 'enum' requires an 'enum' key".to_string(),
        }),
    }
}

/// Normalize a declared default against the field's own kind.
fn default_presence(
    kind: &FieldKind,
    default: &Value,
    location: &str,
) -> Result<Presence, ConfigurationError> {
    if default.is_null() {
        return Ok(Presence::Optional);
    }
    let mut errors = Vec::new();
    let field = FieldPath::root().field(location);
    match coerce(kind, &FieldValue::from(default), &field, &mut errors) {
        Some(value) if errors.is_empty() => Ok(Presence::Default(value)),
        _ => Err(ConfigurationError::InvalidDefault {
            field: location.to_string(),
            reason: errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        }),
    }
}

/// Whether a spec describes a nested model rather than a leaf.
fn describes_model(spec: &Map<String, Value>) -> bool {
    match spec.get("type") {
        None | Some(Value::Object(_)) => true,
        Some(Value::String(token)) => token == "dict",
        Some(_) => false,
    }
}

/// An attribute of a field spec. In a nested description a mapping value
/// names a sub-field instead.
fn attribute<'a>(spec: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let value = spec.get(key)?;
    (!value.is_object() || !describes_model(spec)).then_some(value)
}

fn is_attribute(key: &str, value: &Value) -> bool {
    ATTRIBUTE_KEYS.contains(&key) && !value.is_object()
}

/// First letter upper-case, the rest lower-case.
fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
