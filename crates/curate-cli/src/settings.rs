//! # CLI Settings
//!
//! Where the CLI finds schemas and keeps records. Values come from, in
//! increasing precedence:
//!
//! 1. Built-in defaults.
//! 2. The `--config <file>` document (YAML or JSON).
//! 3. `CURATE_STORE_DIR` and `CURATE_EXPORT_DIR` in the environment.
//!
//! ```yaml
//! schema_dir: schemas        # optional: dataset.yaml / edition.yaml overrides
//! qa_schema: qa/metadata.schema.json
//! store_dir: .curate/records
//! export_dir: exports
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use curate_config::{MetadataConfig, RecordKind};
use curate_core::load_document;
use curate_schema::{qa_schema, ModelCompiler, StructuralValidator};
use curate_state::{JsonDirStore, UploadService};

/// Environment variable overriding [`Settings::store_dir`].
pub const STORE_DIR_ENV: &str = "CURATE_STORE_DIR";
/// Environment variable overriding [`Settings::export_dir`].
pub const EXPORT_DIR_ENV: &str = "CURATE_EXPORT_DIR";

const SCHEMA_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding `<kind>.yaml` (or `.yml`, `.json`) schema
    /// descriptions that replace the built-in ones. Kinds without a file
    /// keep their built-in schema.
    pub schema_dir: Option<PathBuf>,
    /// QA schema used by `curate qa` when `--schema` is not given.
    pub qa_schema: Option<PathBuf>,
    /// Directory of the record store.
    pub store_dir: PathBuf,
    /// Default directory for exports.
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_dir: None,
            qa_schema: None,
            store_dir: PathBuf::from(".curate/records"),
            export_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Settings from an optional config file plus environment overrides.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be loaded or has unknown keys.
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let settings = match config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(settings.with_overrides(|name| std::env::var(name).ok()))
    }

    /// Settings from a YAML or JSON file, without environment overrides.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, malformed, or has unknown keys.
    pub fn from_file(path: &Path) -> Result<Self> {
        let document = load_document(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;
        let settings: Self = serde_json::from_value(document)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(STORE_DIR_ENV) {
            tracing::debug!(%dir, var = STORE_DIR_ENV, "store directory overridden");
            self.store_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(EXPORT_DIR_ENV) {
            tracing::debug!(%dir, var = EXPORT_DIR_ENV, "export directory overridden");
            self.export_dir = PathBuf::from(dir);
        }
        self
    }

    /// The schema description overriding `kind`'s built-in one, if the
    /// schema directory has a file for it.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be parsed.
    pub fn schema_for(&self, kind: RecordKind) -> Result<Option<Value>> {
        let Some(dir) = &self.schema_dir else {
            return Ok(None);
        };
        for ext in SCHEMA_EXTENSIONS {
            let path = dir.join(format!("{kind}.{ext}"));
            if path.is_file() {
                tracing::info!(%kind, path = %path.display(), "using schema override");
                let schema = load_document(&path)
                    .with_context(|| format!("failed to load {kind} schema"))?;
                return Ok(Some(schema));
            }
        }
        Ok(None)
    }

    /// An empty config engine for `kind`, honouring schema overrides.
    ///
    /// # Errors
    ///
    /// Fails if the schema cannot be loaded or compiled.
    pub fn metadata_config(
        &self,
        kind: RecordKind,
        compiler: &mut ModelCompiler,
    ) -> Result<MetadataConfig> {
        let config = match self.schema_for(kind)? {
            Some(schema) => MetadataConfig::with_schema(kind, &schema, compiler),
            None => MetadataConfig::new(kind, compiler),
        };
        config.with_context(|| format!("failed to compile the {kind} schema"))
    }

    /// An upload service with every schema override registered.
    ///
    /// # Errors
    ///
    /// Fails if an override exists but cannot be parsed.
    pub fn upload_service(&self) -> Result<UploadService> {
        let mut service = UploadService::new();
        for kind in RecordKind::ALL {
            if let Some(schema) = self.schema_for(kind)? {
                service = service.with_schema(kind, schema);
            }
        }
        Ok(service)
    }

    /// The structural validator for `explicit`, else the configured QA
    /// schema, else the built-in one.
    ///
    /// # Errors
    ///
    /// Fails if the chosen schema cannot be loaded or is not an object.
    pub fn qa_validator(&self, explicit: Option<&Path>) -> Result<StructuralValidator> {
        match explicit.or(self.qa_schema.as_deref()) {
            Some(path) => StructuralValidator::from_file(path)
                .with_context(|| format!("failed to load QA schema {}", path.display())),
            None => {
                let schema = qa_schema().context("built-in QA schema is malformed")?;
                StructuralValidator::new(schema).context("built-in QA schema is malformed")
            }
        }
    }

    /// Open (creating if needed) the record store.
    ///
    /// # Errors
    ///
    /// Fails if the store directory cannot be created or read.
    pub fn open_store(&self) -> Result<JsonDirStore> {
        JsonDirStore::open(self.store_dir.clone())
            .with_context(|| format!("failed to open record store {}", self.store_dir.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.store_dir, PathBuf::from(".curate/records"));
        assert_eq!(settings.export_dir, PathBuf::from("."));
        assert!(settings.schema_dir.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curate.yaml");
        std::fs::write(&path, "export_dir: out\n").unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.export_dir, PathBuf::from("out"));
        assert_eq!(settings.store_dir, PathBuf::from(".curate/records"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curate.json");
        std::fs::write(&path, r#"{"store": "x"}"#).unwrap();
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/curate.yaml"))).is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let settings = Settings::default().with_overrides(|name| match name {
            STORE_DIR_ENV => Some("/srv/records".to_string()),
            _ => None,
        });
        assert_eq!(settings.store_dir, PathBuf::from("/srv/records"));
        assert_eq!(settings.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_schema_for_finds_override_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("edition.yml"), "edition: {type: string}\n").unwrap();
        let settings = Settings {
            schema_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let schema = settings.schema_for(RecordKind::Edition).unwrap().unwrap();
        assert_eq!(schema["edition"]["type"], "string");
        assert!(settings.schema_for(RecordKind::Dataset).unwrap().is_none());
    }

    #[test]
    fn test_builtin_qa_validator() {
        let validator = Settings::default().qa_validator(None).unwrap();
        assert!(validator.schema().contains_key("properties"));
    }
}
