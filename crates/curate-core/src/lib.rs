//! # curate-core: Foundational Types for Metadata Curation
//!
//! Leaf crate of the curation workspace. Every other `curate-*` crate
//! depends on it; it depends on nothing internal.
//!
//! ## Contents
//!
//! - [`value`]: `FieldValue`, the dynamically-typed tree a metadata record
//!   is made of, and `Record`, the canonical field map.
//! - [`enums`]: closed enumerated value types (`DatasetType`, `AlertType`,
//!   `QualityDesignation`, `DistributionFormat`, `MediaType`) with lenient
//!   parsing, plus the runtime `EnumSet` used by schema descriptions.
//! - [`temporal`]: UTC-only `Timestamp` with lenient ISO-8601 ingestion.
//! - [`document`]: JSON/YAML document loading with format detection.
//! - [`serialize`]: the serialization bridge from `FieldValue` to
//!   JSON-safe primitives.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `curate-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod enums;
pub mod error;
pub mod serialize;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use document::{load_document, parse_document, DocumentFormat};
pub use enums::{
    AlertType, ClosedEnum, DatasetType, DistributionFormat, EnumMember, EnumSet, MediaType,
    QualityDesignation,
};
pub use error::{CurateError, DocumentError};
pub use serialize::{record_to_json, to_json, to_json_pretty};
pub use temporal::Timestamp;
pub use value::{EnumValue, FieldValue, Record};
