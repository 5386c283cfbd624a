//! Schema descriptions shipped with the crate.
//!
//! The dataset and edition descriptions feed the model compiler; the QA
//! description feeds the structural validator. All three are embedded at
//! build time.

use serde_json::Value;

use curate_core::{parse_document, DocumentError, DocumentFormat};

/// Model name of the dataset record kind.
pub const DATASET_MODEL: &str = "DatasetModel";

/// Model name of the edition record kind.
pub const EDITION_MODEL: &str = "EditionModel";

const DATASET_SCHEMA: &str = include_str!("../schemas/dataset.yaml");
const EDITION_SCHEMA: &str = include_str!("../schemas/edition.yaml");
const QA_SCHEMA: &str = include_str!("../schemas/qa/metadata.schema.json");

/// The dataset schema description.
///
/// # Errors
///
/// Returns [`DocumentError::Parse`] if the embedded document is malformed.
pub fn dataset_schema() -> Result<Value, DocumentError> {
    parse_builtin("dataset.yaml", DATASET_SCHEMA, DocumentFormat::Yaml)
}

/// The edition schema description.
///
/// # Errors
///
/// Returns [`DocumentError::Parse`] if the embedded document is malformed.
pub fn edition_schema() -> Result<Value, DocumentError> {
    parse_builtin("edition.yaml", EDITION_SCHEMA, DocumentFormat::Yaml)
}

/// The JSON-Schema-style description used for QA audits of dataset
/// records.
///
/// # Errors
///
/// Returns [`DocumentError::Parse`] if the embedded document is malformed.
pub fn qa_schema() -> Result<Value, DocumentError> {
    parse_builtin("qa/metadata.schema.json", QA_SCHEMA, DocumentFormat::Json)
}

fn parse_builtin(name: &str, content: &str, format: DocumentFormat) -> Result<Value, DocumentError> {
    parse_document(content, format).map_err(|reason| DocumentError::Parse {
        path: format!("<builtin>/{name}"),
        format,
        reason,
    })
}
