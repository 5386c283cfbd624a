//! # curate CLI entry point
//!
//! Parses command-line arguments, resolves settings, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use curate_cli::export::{run_export, ExportArgs};
use curate_cli::qa::{run_qa, QaArgs};
use curate_cli::record::{
    run_approve, run_edit, run_list, run_show, run_upload, ApproveArgs, EditArgs, ListArgs,
    ShowArgs, UploadArgs,
};
use curate_cli::validate::{run_validate, ValidateArgs};
use curate_cli::Settings;

/// Metadata curation toolkit.
///
/// Validates dataset and edition metadata against compiled schema models,
/// audits it against QA schemas, and moves records through the
/// upload and approval workflow.
#[derive(Parser, Debug)]
#[command(name = "curate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit log lines as JSON objects.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a settings file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a metadata file against its record kind's model.
    Validate(ValidateArgs),

    /// Audit a metadata file against a QA schema.
    Qa(QaArgs),

    /// Upload a metadata file as a pending record.
    Upload(UploadArgs),

    /// Assign one field of a stored record.
    Edit(EditArgs),

    /// Approve a pending record.
    Approve(ApproveArgs),

    /// Print a stored record.
    Show(ShowArgs),

    /// List stored records.
    List(ListArgs),

    /// Export a stored record as JSON, YAML or HTML.
    Export(ExportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(?settings, "resolved settings");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &settings),
        Commands::Qa(args) => run_qa(&args, &settings),
        Commands::Upload(args) => run_upload(&args, &settings),
        Commands::Edit(args) => run_edit(&args, &settings),
        Commands::Approve(args) => run_approve(&args, &settings),
        Commands::Show(args) => run_show(&args, &settings),
        Commands::List(args) => run_list(&args, &settings),
        Commands::Export(args) => run_export(&args, &settings),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
