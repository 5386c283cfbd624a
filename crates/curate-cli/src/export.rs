//! # Export Subcommand
//!
//! Renders a stored record as JSON, YAML or HTML. The whole record
//! (status, uploader, transitions, metadata) is exported unless
//! `--metadata` asks for the canonical metadata alone.
//!
//! Without `--out` the file goes to [`Settings::export_dir`]: records as
//! `record-<id>.<ext>`, metadata as `<title>_metadata.<ext>`. `--out -`
//! writes to standard output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use curate_config::ExportFormat;
use curate_core::record_to_json;
use curate_schema::ModelCompiler;

use crate::record::fetch;
use crate::settings::Settings;

/// Arguments for the `curate export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Record identifier.
    #[arg(value_name = "ID")]
    pub id: u64,

    /// Output format: json, yaml or html.
    #[arg(long, default_value = "json")]
    pub format: ExportFormat,

    /// Output file, or `-` for standard output.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Export only the canonical metadata.
    #[arg(long)]
    pub metadata: bool,
}

/// Execute the export subcommand.
pub fn run_export(args: &ExportArgs, settings: &Settings) -> Result<u8> {
    let store = settings.open_store()?;
    let record = fetch(&store, args.id)?;

    let (document, stem) = if args.metadata {
        let mut compiler = ModelCompiler::new();
        let mut config = settings.metadata_config(record.kind, &mut compiler)?;
        config
            .import(&record.metadata)
            .with_context(|| format!("stored metadata of record {} no longer validates", args.id))?;

        if args.out.is_none() && args.format == ExportFormat::Json {
            let path = config
                .export(&settings.export_dir)
                .context("failed to export metadata")?;
            println!("Exported record {} metadata to {}", args.id, path.display());
            return Ok(0);
        }
        (
            record_to_json(config.metadata()),
            format!("{}_metadata", config.export_stem()),
        )
    } else {
        let document = record
            .to_document()
            .with_context(|| format!("failed to render record {}", args.id))?;
        (document, format!("record-{}", args.id))
    };

    match args.out.as_deref() {
        Some(path) if path == Path::new("-") => {
            print!("{}", args.format.render(&document)?);
        }
        Some(path) => write(args, &document, path)?,
        None => {
            std::fs::create_dir_all(&settings.export_dir).with_context(|| {
                format!("failed to create {}", settings.export_dir.display())
            })?;
            let path = settings
                .export_dir
                .join(format!("{stem}.{}", args.format.extension()));
            write(args, &document, &path)?;
        }
    }
    Ok(0)
}

fn write(args: &ExportArgs, document: &Value, path: &Path) -> Result<()> {
    args.format
        .write(document, path)
        .with_context(|| format!("failed to export record {}", args.id))?;
    println!("Exported record {} to {}", args.id, path.display());
    Ok(())
}
