//! Dataset `file` field resolution.
//!
//! A dataset may reference its data file by path. Before validation the
//! path is replaced by a descriptor `{path, format, size}` taken from the
//! filesystem: `format` is the extension without the dot and `size` the
//! length in bytes. This is the only field whose assignment touches the
//! filesystem.

use std::path::Path;

use curate_core::{FieldValue, Record};

use crate::error::ConfigError;

/// Name of the dataset field that references a data file.
pub const FILE_FIELD: &str = "file";

/// Resolve a `file` value into a descriptor.
///
/// A string or path is stat-ed and described; a mapping is assumed to be
/// a descriptor already and is passed through for validation, as is
/// `null`.
///
/// # Errors
///
/// Returns [`ConfigError::FileNotFound`] if the referenced path does not
/// exist, or [`ConfigError::Io`] if its metadata cannot be read.
pub fn resolve_file(value: FieldValue) -> Result<FieldValue, ConfigError> {
    match value {
        FieldValue::String(path) => describe_file(Path::new(&path)),
        FieldValue::Path(path) => describe_file(&path),
        other => Ok(other),
    }
}

/// Describe an existing file.
///
/// # Errors
///
/// As [`resolve_file`].
pub fn describe_file(path: &Path) -> Result<FieldValue, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            field: FILE_FIELD.to_string(),
            path: path.display().to_string(),
        });
    }
    let size = std::fs::metadata(path)
        .map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?
        .len();
    let format = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(path = %path.display(), %format, size, "resolved dataset file");

    let mut descriptor = Record::new();
    descriptor.insert("path".into(), FieldValue::String(path.display().to_string()));
    descriptor.insert("format".into(), FieldValue::String(format));
    descriptor.insert(
        "size".into(),
        FieldValue::Int(i64::try_from(size).unwrap_or(i64::MAX)),
    );
    Ok(FieldValue::Map(descriptor))
}
