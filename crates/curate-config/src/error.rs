//! Config engine errors.

use curate_core::{CurateError, DocumentError};
use curate_schema::{ConfigurationError, ValidationError};
use thiserror::Error;

/// Error from a config engine operation.
///
/// Every failing operation leaves the engine's record exactly as it was.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The key does not name a field of the record's schema.
    #[error("invalid field '{key}'; valid fields: {valid:?}")]
    UnknownField {
        /// The key that was requested.
        key: String,
        /// Field names valid at the level where lookup failed.
        valid: Vec<String>,
    },

    /// The candidate record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The schema description could not be compiled.
    #[error("schema error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A metadata file could not be found, read or parsed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A file referenced by a field does not exist.
    #[error("file not found for field '{field}': {path}")]
    FileNotFound {
        /// The field that referenced the file.
        field: String,
        /// The missing path.
        path: String,
    },

    /// A value has a shape the operation cannot use.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// The field being assigned.
        key: String,
        /// Why the value was rejected before validation.
        reason: String,
    },

    /// A record kind name was not recognised.
    #[error("unknown record kind: {0:?}")]
    UnknownKind(String),

    /// An export format name was not recognised.
    #[error("unknown export format: {0:?}")]
    UnknownFormat(String),

    /// Rendering a record failed.
    #[error("render error: {0}")]
    Render(String),

    /// Serialization bridge failure.
    #[error(transparent)]
    Core(#[from] CurateError),

    /// Filesystem error while exporting.
    #[error("io error at {path}: {source}")]
    Io {
        /// Path being written.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Whether the failure is a missing file, either the metadata file
    /// itself or one a field refers to.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::FileNotFound { .. } => true,
            Self::Document(e) => e.is_not_found(),
            _ => false,
        }
    }
}
