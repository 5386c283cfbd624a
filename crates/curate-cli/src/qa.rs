//! # QA Subcommand
//!
//! Structural audit of a metadata file. By default the raw document is
//! audited as written; with `--kind` it is first loaded through the
//! config engine and the canonical record is audited instead, with its
//! `null` placeholders read as absent fields.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use curate_config::{ConfigError, RecordKind};
use curate_core::load_document;
use curate_schema::ModelCompiler;

use crate::settings::Settings;

/// Arguments for the `curate qa` subcommand.
#[derive(Args, Debug)]
pub struct QaArgs {
    /// Metadata file (JSON or YAML).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// QA schema to audit against. Defaults to the configured or
    /// built-in dataset QA schema.
    #[arg(long, value_name = "SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Canonicalise the file as this record kind before auditing.
    #[arg(long, value_name = "KIND")]
    pub kind: Option<RecordKind>,
}

/// Execute the qa subcommand.
///
/// Returns exit code 0 if the audit passes and 1 if it reports errors.
pub fn run_qa(args: &QaArgs, settings: &Settings) -> Result<u8> {
    let validator = settings.qa_validator(args.schema.as_deref())?;

    let report = match args.kind {
        Some(kind) => {
            let mut compiler = ModelCompiler::new();
            let mut config = settings.metadata_config(kind, &mut compiler)?;
            match config.load(&args.path) {
                Ok(()) => validator.validate_canonical(config.metadata()),
                Err(e @ ConfigError::Validation(_)) => {
                    println!("FAIL: {} is not valid {kind} metadata", args.path.display());
                    println!("{e}");
                    return Ok(1);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("cannot load {}", args.path.display()))
                }
            }
        }
        None => {
            let document = load_document(&args.path)
                .with_context(|| format!("cannot audit {}", args.path.display()))?;
            validator
                .validate_json(&document)
                .with_context(|| format!("cannot audit {}", args.path.display()))?
        }
    };

    tracing::info!(path = %args.path.display(), errors = report.errors().len(), "QA audit finished");
    println!("{report}");
    Ok(if report.is_valid() { 0 } else { 1 })
}
