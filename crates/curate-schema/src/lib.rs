//! # curate-schema: Schema-Driven Validation
//!
//! Two validation paths over metadata records:
//!
//! - [`ModelCompiler`] turns a schema description into a
//!   [`CompiledModel`]. `construct` validates a record strictly and
//!   returns its canonical form, or a [`ValidationError`] listing every
//!   failure. Config engine mutations go through this path.
//! - [`StructuralValidator`] audits a record against a JSON-Schema-style
//!   description and returns a [`QaReport`]. It never rejects.
//!
//! Both walk records with the same recursive descent (`walk`).

pub mod builtin;
pub mod compiler;
pub mod error;
pub mod model;
pub mod path;
pub mod structural;

mod walk;

pub use builtin::{dataset_schema, edition_schema, qa_schema, DATASET_MODEL, EDITION_MODEL};
pub use compiler::ModelCompiler;
pub use error::{ConfigurationError, FieldError, FieldErrorKind, InvocationError, ValidationError};
pub use model::{CompiledModel, FieldDef, FieldKind, Presence, ScalarType};
pub use path::FieldPath;
pub use structural::{QaReport, StructuralValidator};
