//! # Error Types
//!
//! Crate-spanning error hierarchy for the curation workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Crates higher in the stack define their own focused error enums
//! (`ConfigurationError`, `ValidationError`, `ConfigError`, `WorkflowError`)
//! and only the umbrella [`CurateError`] lives here.

use thiserror::Error;

use crate::document::DocumentFormat;

/// Top-level error type for the curation workspace.
#[derive(Error, Debug)]
pub enum CurateError {
    /// A schema or metadata document could not be loaded.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A timestamp string could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Error while loading a JSON or YAML document from disk.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file does not exist.
    #[error("{path} not found")]
    NotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file exists but does not parse in the detected format.
    #[error("invalid {format} in '{path}': {reason}")]
    Parse {
        /// Path to the document.
        path: String,
        /// Format the document was parsed as.
        format: DocumentFormat,
        /// Parser diagnostic.
        reason: String,
    },

    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path to the document.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    /// Whether this error reports a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
