//! # Schema Errors
//!
//! Two failure classes with different owners:
//!
//! - [`ConfigurationError`] is a schema-author bug found while compiling a
//!   schema description. It is fatal at schema-load time.
//! - [`ValidationError`] is a user-data problem found while constructing a
//!   record. It carries every field-level failure, not just the first.

use std::fmt;

use thiserror::Error;

use curate_core::DocumentError;

use crate::path::FieldPath;

/// Error compiling a schema description into a model.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A field declares a type token the compiler does not know.
    #[error("unsupported type '{type_token}' for field '{field}'")]
    UnsupportedType {
        /// Dotted field path within the schema.
        field: String,
        /// The offending type token.
        type_token: String,
    },

    /// A field specification is structurally invalid.
    #[error("malformed specification for field '{field}': {reason}")]
    MalformedSpec {
        /// Dotted field path within the schema.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An `enum` key names a type that is not a built-in enumeration.
    #[error("field '{field}' refers to unknown enumeration '{name}'")]
    UnknownEnum {
        /// Dotted field path within the schema.
        field: String,
        /// The unknown enumeration name.
        name: String,
    },

    /// A declared default does not satisfy the field's own type.
    #[error("invalid default for field '{field}': {reason}")]
    InvalidDefault {
        /// Dotted field path within the schema.
        field: String,
        /// Why the default was rejected.
        reason: String,
    },

    /// A model name was reused for a different schema shape.
    #[error("model '{name}' is already compiled with a different shape")]
    ConflictingModel {
        /// The model name.
        name: String,
    },

    /// The schema description (or a nested one) is not a mapping.
    #[error("schema for model '{model}' must be a mapping, found {found}")]
    NotAMapping {
        /// The model being compiled.
        model: String,
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// The schema file could not be loaded.
    #[error("schema load error: {0}")]
    Document(#[from] DocumentError),
}

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldErrorKind {
    /// A required field is absent.
    Missing,
    /// A key is present that the model does not declare.
    UnknownField,
    /// The value does not have the declared type.
    TypeMismatch {
        /// Declared type.
        expected: String,
        /// Runtime type of the supplied value.
        actual: &'static str,
    },
    /// The value is not a member of the declared closed set.
    NotInEnum {
        /// Name of the enumeration.
        enum_name: String,
        /// Permitted values in declaration order.
        allowed: Vec<String>,
        /// Rendering of the rejected value.
        actual: String,
    },
    /// A string could not be interpreted as a date-time.
    InvalidDateTime {
        /// Parser diagnostic.
        reason: String,
    },
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Location of the failing field.
    pub path: FieldPath,
    /// What went wrong.
    pub kind: FieldErrorKind,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };
        match &self.kind {
            FieldErrorKind::Missing => write!(f, "{path}: field required"),
            FieldErrorKind::UnknownField => write!(f, "{path}: unexpected field"),
            FieldErrorKind::TypeMismatch { expected, actual } => {
                write!(f, "{path}: expected {expected}, got {actual}")
            }
            FieldErrorKind::NotInEnum {
                enum_name,
                allowed,
                actual,
            } => write!(
                f,
                "{path}: {actual} is not a valid {enum_name}; allowed values: {allowed:?}"
            ),
            FieldErrorKind::InvalidDateTime { reason } => {
                write!(f, "{path}: invalid datetime: {reason}")
            }
        }
    }
}

/// A record failed to construct against a compiled model.
#[derive(Error, Debug, Clone)]
#[error("validation failed for model '{model}' with {} error(s):\n{}", .errors.len(), render(.errors))]
pub struct ValidationError {
    /// Name of the model that rejected the record.
    pub model: String,
    /// Every field failure, in traversal order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Failures as a slice.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any failure is located at the given dotted path.
    pub fn mentions(&self, dotted: &str) -> bool {
        self.errors.iter().any(|e| e.path.to_string() == dotted)
    }
}

fn render(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The structural validator was invoked with inputs of the wrong shape.
///
/// Value-level problems are never reported this way; they go into the
/// [`QaReport`](crate::QaReport).
#[derive(Error, Debug)]
pub enum InvocationError {
    /// The schema or the metadata is not a mapping.
    #[error("{what} must be an object, found {found}")]
    NotAnObject {
        /// Which input was malformed (`schema` or `metadata`).
        what: &'static str,
        /// Type that was found instead.
        found: &'static str,
    },

    /// A schema or metadata file could not be loaded.
    #[error(transparent)]
    Document(#[from] DocumentError),
}
