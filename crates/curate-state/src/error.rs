//! Workflow and persistence errors.

use curate_config::ConfigError;
use thiserror::Error;

use crate::record::UploadStatus;
use crate::user::Action;

/// Error from the record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record has this identifier.
    #[error("file record {id} not found")]
    NotFound {
        /// The requested identifier.
        id: u64,
    },

    /// An update was attempted on a record that was never added.
    #[error("file record has no identifier; add it before updating")]
    Unsaved,

    /// A stored document could not be encoded or decoded.
    #[error("serialization error for {path}: {reason}")]
    Serialization {
        /// Location of the document.
        path: String,
        /// Encoder or decoder diagnostic.
        reason: String,
    },

    /// Filesystem error.
    #[error("io error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Error from the upload and approval workflow.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The user's role does not allow the action.
    #[error("user '{user}' does not have permission to {action}")]
    PermissionDenied {
        /// Username.
        user: String,
        /// The attempted action.
        action: Action,
    },

    /// The record is not in a state that allows the transition.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: UploadStatus,
        /// Attempted status.
        to: UploadStatus,
    },

    /// Loading or editing the metadata failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
