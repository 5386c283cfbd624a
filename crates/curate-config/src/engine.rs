//! # Config Engine
//!
//! [`MetadataConfig`] owns the canonical metadata record of one kind.
//! Every mutation builds a complete candidate record, runs it through the
//! compiled model, and commits only on success: a failed `load`, `import`
//! or `set` leaves the record exactly as it was.
//!
//! ## Keys
//!
//! Top-level fields are addressed by name (`title`); fields of nested
//! models by dotted path (`contact.email`). A key that does not resolve
//! through the model fails with [`ConfigError::UnknownField`] listing the
//! valid names at the level where resolution stopped.
//!
//! ## Kind-specific behaviour
//!
//! For dataset records the `file` field is resolved from a path into a
//! `{path, format, size}` descriptor before validation (see
//! [`dataset`](crate::dataset)). Setting `file.path` resolves the new path
//! the same way; `file.format` and `file.size` cannot be set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use curate_core::{load_document, to_json_pretty, FieldValue, Record};
use curate_schema::{CompiledModel, FieldKind, ModelCompiler};

use crate::dataset::{resolve_file, FILE_FIELD};
use crate::error::ConfigError;
use crate::kind::RecordKind;

static NULL: FieldValue = FieldValue::Null;

/// Fields tried, in order, to name an exported file.
const TITLE_FIELDS: &[&str] = &["title", "edition_title"];

/// The canonical metadata record of one kind, mutated only through
/// re-validation.
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    kind: RecordKind,
    model: Arc<CompiledModel>,
    metadata: Record,
    loaded: bool,
}

impl MetadataConfig {
    /// An empty engine for `kind` using its built-in schema.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Configuration`] if the schema does not compile.
    pub fn new(kind: RecordKind, compiler: &mut ModelCompiler) -> Result<Self, ConfigError> {
        let schema = kind.builtin_schema()?;
        Self::with_schema(kind, &schema, compiler)
    }

    /// An empty dataset engine.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn dataset(compiler: &mut ModelCompiler) -> Result<Self, ConfigError> {
        Self::new(RecordKind::Dataset, compiler)
    }

    /// An empty edition engine.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn edition(compiler: &mut ModelCompiler) -> Result<Self, ConfigError> {
        Self::new(RecordKind::Edition, compiler)
    }

    /// An empty engine for `kind` using a custom schema description.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Configuration`] if the schema does not compile.
    pub fn with_schema(
        kind: RecordKind,
        schema: &Value,
        compiler: &mut ModelCompiler,
    ) -> Result<Self, ConfigError> {
        let model = compiler.compile(kind.model_name(), schema)?;
        Ok(Self::from_model(kind, model))
    }

    /// An empty engine for an already compiled model.
    pub fn from_model(kind: RecordKind, model: Arc<CompiledModel>) -> Self {
        Self {
            kind,
            model,
            metadata: Record::new(),
            loaded: false,
        }
    }

    /// The record kind.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The compiled model every mutation is validated against.
    pub fn model(&self) -> &CompiledModel {
        &self.model
    }

    /// Whether a record has been successfully loaded or imported.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The canonical record. Empty until a load or import succeeds.
    pub fn metadata(&self) -> &Record {
        &self.metadata
    }

    /// Consume the engine, returning the canonical record.
    pub fn into_metadata(self) -> Record {
        self.metadata
    }

    /// Top-level field names in schema order.
    pub fn valid_keys(&self) -> Vec<String> {
        self.model.field_names().into_iter().map(str::to_string).collect()
    }

    /// Load a JSON or YAML metadata file and import it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Document`] if the file is missing or
    /// malformed, otherwise as [`import`](Self::import).
    pub fn load(&mut self, path: &Path) -> Result<(), ConfigError> {
        let data = load_document(path)?;
        tracing::info!(kind = %self.kind, path = %path.display(), "loading metadata");
        self.import_json(&data)
    }

    /// Replace the record with `data` after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `data` does not satisfy the
    /// model, or [`ConfigError::FileNotFound`] if a dataset's `file` path
    /// does not exist. The record is unchanged on error.
    pub fn import(&mut self, data: &Record) -> Result<(), ConfigError> {
        let mut candidate = data.clone();
        if let Some(value) = candidate.remove(FILE_FIELD) {
            let prepared = self.prepare(FILE_FIELD, value)?;
            candidate.insert(FILE_FIELD.to_string(), prepared);
        }
        self.commit(candidate)
    }

    /// [`import`](Self::import) for raw JSON.
    ///
    /// # Errors
    ///
    /// As `import`; a non-object document is rejected with
    /// [`ConfigError::InvalidValue`].
    pub fn import_json(&mut self, data: &Value) -> Result<(), ConfigError> {
        match FieldValue::from(data) {
            FieldValue::Map(record) => self.import(&record),
            other => Err(ConfigError::InvalidValue {
                key: self.kind.to_string(),
                reason: format!("metadata must be an object, found {}", other.type_name()),
            }),
        }
    }

    /// Current value of a field. A known field of an engine that has not
    /// been loaded yet reads as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownField`] if `key` is not a field.
    pub fn get(&self, key: &str) -> Result<&FieldValue, ConfigError> {
        self.check_key(key)?;
        let (head, rest) = split_key(key);
        let top = self.metadata.get(head).unwrap_or(&NULL);
        Ok(match rest {
            Some(rest) => top.lookup(rest).unwrap_or(&NULL),
            None => top,
        })
    }

    /// Assign a field and re-validate the whole record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownField`] for an unknown key,
    /// [`ConfigError::Validation`] if the resulting record is invalid, or
    /// [`ConfigError::FileNotFound`] for a dataset `file` path that does
    /// not exist. The record is unchanged on error.
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<(), ConfigError> {
        let key = self.file_key(key)?;
        self.check_key(key)?;
        let value = self.prepare(key, value.into())?;

        let mut candidate = self.metadata.clone();
        let segments: Vec<&str> = key.split('.').collect();
        assign(&mut candidate, &segments, value);

        tracing::debug!(kind = %self.kind, key, "setting field");
        self.commit(candidate)
    }

    /// Write the record as pretty JSON to `<title>_metadata.json` in
    /// `directory`, creating the directory if needed.
    ///
    /// The file is named after `title`, then `edition_title`, then
    /// `config`; path separators in the name are replaced with `_`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory or file cannot be
    /// written.
    pub fn export(&self, directory: &Path) -> Result<PathBuf, ConfigError> {
        std::fs::create_dir_all(directory).map_err(|source| ConfigError::Io {
            path: directory.display().to_string(),
            source,
        })?;
        let path = directory.join(format!("{}_metadata.json", self.export_stem()));
        let body = to_json_pretty(&self.metadata)?;
        std::fs::write(&path, body).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(kind = %self.kind, path = %path.display(), "exported metadata");
        Ok(path)
    }

    /// File-name stem used by [`export`](Self::export).
    pub fn export_stem(&self) -> String {
        let title = TITLE_FIELDS
            .iter()
            .filter_map(|field| self.metadata.get(*field).and_then(FieldValue::as_str))
            .find(|title| !title.trim().is_empty())
            .unwrap_or("config");
        title
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect()
    }

    /// A dataset's file descriptor is only ever written whole: `file.path`
    /// re-describes the file, the other descriptor fields are read-only.
    fn file_key<'k>(&self, key: &'k str) -> Result<&'k str, ConfigError> {
        if self.kind != RecordKind::Dataset {
            return Ok(key);
        }
        match split_key(key) {
            (FILE_FIELD, Some("path")) => Ok(FILE_FIELD),
            (FILE_FIELD, Some(_)) => Err(ConfigError::UnknownField {
                key: key.to_string(),
                valid: vec![FILE_FIELD.to_string(), format!("{FILE_FIELD}.path")],
            }),
            _ => Ok(key),
        }
    }

    fn prepare(&self, key: &str, value: FieldValue) -> Result<FieldValue, ConfigError> {
        match self.kind {
            RecordKind::Dataset if key == FILE_FIELD => resolve_file(value),
            _ => Ok(value),
        }
    }

    fn commit(&mut self, candidate: Record) -> Result<(), ConfigError> {
        let canonical = self.model.construct(&candidate)?;
        self.metadata = canonical;
        self.loaded = true;
        Ok(())
    }

    /// Resolve a (possibly dotted) key through the model's nested fields.
    fn check_key(&self, key: &str) -> Result<(), ConfigError> {
        let mut model: &CompiledModel = self.model.as_ref();
        let mut prefix = String::new();
        let mut segments = key.split('.').peekable();

        while let Some(segment) = segments.next() {
            let Some(field) = model.field(segment) else {
                return Err(ConfigError::UnknownField {
                    key: key.to_string(),
                    valid: model
                        .field_names()
                        .into_iter()
                        .map(|name| format!("{prefix}{name}"))
                        .collect(),
                });
            };
            if segments.peek().is_none() {
                return Ok(());
            }
            match &field.kind {
                FieldKind::Nested(inner) => {
                    model = inner.as_ref();
                    prefix.push_str(segment);
                    prefix.push('.');
                }
                _ => {
                    return Err(ConfigError::UnknownField {
                        key: key.to_string(),
                        valid: vec![format!("{prefix}{segment}")],
                    })
                }
            }
        }
        Ok(())
    }
}

fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (key, None),
    }
}

/// Write `value` at `segments` inside `record`, creating intermediate maps
/// where the current value is not one.
fn assign(record: &mut Record, segments: &[&str], value: FieldValue) {
    match segments {
        [] => {}
        [last] => {
            record.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let slot = record
                .entry((*head).to_string())
                .or_insert(FieldValue::Null);
            if !matches!(slot, FieldValue::Map(_)) {
                *slot = FieldValue::Map(Record::new());
            }
            if let FieldValue::Map(inner) = slot {
                assign(inner, rest, value);
            }
        }
    }
}
