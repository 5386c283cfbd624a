//! # Validate Subcommand
//!
//! Loads a metadata file through the config engine for its record kind:
//! the file must satisfy the compiled model strictly. On success the
//! canonical record can be printed with `--show`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curate_config::{ConfigError, RecordKind};
use curate_core::to_json_pretty;
use curate_schema::ModelCompiler;

use crate::settings::Settings;

/// Arguments for the `curate validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Record kind: dataset or edition.
    #[arg(value_name = "KIND")]
    pub kind: RecordKind,

    /// Metadata file (JSON or YAML).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print the canonical record after a successful validation.
    #[arg(long)]
    pub show: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code 0 if the file is valid and 1 if it is not.
pub fn run_validate(args: &ValidateArgs, settings: &Settings) -> Result<u8> {
    let mut compiler = ModelCompiler::new();
    let mut config = settings.metadata_config(args.kind, &mut compiler)?;

    match config.load(&args.path) {
        Ok(()) => {
            println!("OK: {} is valid {} metadata", args.path.display(), args.kind);
            if args.show {
                println!("{}", to_json_pretty(config.metadata())?);
            }
            Ok(0)
        }
        Err(e @ (ConfigError::Validation(_) | ConfigError::FileNotFound { .. })) => {
            println!("FAIL: {}", args.path.display());
            println!("{e}");
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| format!("cannot validate {}", args.path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(kind: RecordKind, path: PathBuf) -> ValidateArgs {
        ValidateArgs {
            kind,
            path,
            show: false,
        }
    }

    #[test]
    fn test_valid_edition_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edition.yaml");
        std::fs::write(&path, "dataset_id: pop\nedition: '2025'\nedition_title: E\nrelease_date: 2025-06-01\nversion: 1\n").unwrap();
        let code = run_validate(&args(RecordKind::Edition, path), &Settings::default()).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_invalid_metadata_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        std::fs::write(&path, r#"{"id": "pop", "type": "bogus"}"#).unwrap();
        let code = run_validate(&args(RecordKind::Dataset, path), &Settings::default()).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = run_validate(
            &args(RecordKind::Dataset, PathBuf::from("/nonexistent/curate/d.json")),
            &Settings::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_override_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dataset.yaml"),
            "code:\n  type: int\n  required: true\n",
        )
        .unwrap();
        let settings = Settings {
            schema_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let path = dir.path().join("meta.json");
        std::fs::write(&path, r#"{"code": 7}"#).unwrap();
        assert_eq!(run_validate(&args(RecordKind::Dataset, path.clone()), &settings).unwrap(), 0);
        std::fs::write(&path, r#"{"code": "seven"}"#).unwrap();
        assert_eq!(run_validate(&args(RecordKind::Dataset, path), &settings).unwrap(), 1);
    }
}
