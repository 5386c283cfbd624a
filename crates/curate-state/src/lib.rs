//! # curate-state: File Record Workflow
//!
//! Lifecycle, persistence and services for uploaded metadata records:
//!
//! - [`FileRecord`] with the one-way `Pending → Approved` transition.
//! - [`User`] and [`Role`] permission checks.
//! - [`RecordStore`] with [`MemoryStore`] and [`JsonDirStore`].
//! - [`UploadService`] and [`ApprovalService`].

pub mod error;
pub mod record;
pub mod service;
pub mod store;
pub mod user;

pub use error::{StoreError, WorkflowError};
pub use record::{FileRecord, StatusTransition, UploadStatus};
pub use service::{ApprovalService, UploadService};
pub use store::{JsonDirStore, MemoryStore, RecordStore};
pub use user::{Action, Role, User};
