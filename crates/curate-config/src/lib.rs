//! # curate-config: Metadata Config Engine
//!
//! Owns the canonical metadata record of one [`RecordKind`] and funnels
//! every load, import and edit through re-validation by a compiled model
//! from `curate-schema`. Also provides the export renderers.

pub mod dataset;
pub mod engine;
pub mod error;
pub mod export;
pub mod kind;

pub use dataset::{describe_file, resolve_file, FILE_FIELD};
pub use engine::MetadataConfig;
pub use error::ConfigError;
pub use export::ExportFormat;
pub use kind::RecordKind;
