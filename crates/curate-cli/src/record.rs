//! # Record Workflow Subcommands
//!
//! `upload`, `edit`, `approve`, `show` and `list` over the record store
//! in [`Settings::store_dir`]. Every command opens the store, performs one
//! workflow step through the upload or approval service, and saves.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use curate_config::RecordKind;
use curate_core::FieldValue;
use curate_state::{ApprovalService, FileRecord, JsonDirStore, RecordStore};

use crate::settings::Settings;
use crate::{refusal, ActorArgs};

/// Arguments for the `curate upload` subcommand.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Record kind: dataset or edition.
    #[arg(value_name = "KIND")]
    pub kind: RecordKind,

    /// Metadata file (JSON or YAML).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Arguments for the `curate edit` subcommand.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Record identifier.
    #[arg(value_name = "ID")]
    pub id: u64,

    /// Field to assign; nested fields use dots (`contact.email`).
    #[arg(value_name = "KEY")]
    pub key: String,

    /// New value as JSON. Text that is not valid JSON is taken as a
    /// string.
    #[arg(value_name = "VALUE")]
    pub value: String,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Arguments for the `curate approve` subcommand.
#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Record identifier.
    #[arg(value_name = "ID")]
    pub id: u64,

    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Arguments for the `curate show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Record identifier.
    #[arg(value_name = "ID")]
    pub id: u64,
}

/// Arguments for the `curate list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list records awaiting approval.
    #[arg(long)]
    pub pending: bool,
}

/// Execute the upload subcommand.
pub fn run_upload(args: &UploadArgs, settings: &Settings) -> Result<u8> {
    let mut service = settings.upload_service()?;
    let mut store = settings.open_store()?;
    let user = args.actor.user();

    let mut record = match service.upload(&user, &args.path, args.kind) {
        Ok(record) => record,
        Err(e) => return refusal(e),
    };
    let id = service.save(&mut store, &mut record)?;
    println!(
        "Uploaded {} as {} record {id} ({})",
        args.path.display(),
        record.kind,
        record.status
    );
    Ok(0)
}

/// Execute the edit subcommand.
pub fn run_edit(args: &EditArgs, settings: &Settings) -> Result<u8> {
    let mut service = settings.upload_service()?;
    let mut store = settings.open_store()?;
    let mut record = fetch(&store, args.id)?;

    let value = parse_value(&args.value);
    if let Err(e) = service.set_field(&args.actor.user(), &mut record, &args.key, value) {
        return refusal(e);
    }
    service.save(&mut store, &mut record)?;
    println!("Updated {} on record {}", args.key, args.id);
    Ok(0)
}

/// Execute the approve subcommand.
pub fn run_approve(args: &ApproveArgs, settings: &Settings) -> Result<u8> {
    let mut store = settings.open_store()?;
    let mut record = fetch(&store, args.id)?;

    if let Err(e) = ApprovalService::new().approve(&mut record, &args.actor.user()) {
        return refusal(e);
    }
    store
        .update_file_record(&record)
        .with_context(|| format!("failed to save record {}", args.id))?;
    println!("Record {} {} by {}", args.id, record.status, args.actor.user);
    Ok(0)
}

/// Execute the show subcommand.
pub fn run_show(args: &ShowArgs, settings: &Settings) -> Result<u8> {
    let store = settings.open_store()?;
    let record = fetch(&store, args.id)?;
    let document = record
        .to_document()
        .with_context(|| format!("failed to render record {}", args.id))?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(0)
}

/// Execute the list subcommand.
pub fn run_list(args: &ListArgs, settings: &Settings) -> Result<u8> {
    let store = settings.open_store()?;
    let records = store.list_file_records().context("failed to list records")?;
    for record in records.iter().filter(|r| !args.pending || r.is_pending()) {
        println!("{}", summary(record));
    }
    Ok(0)
}

pub(crate) fn fetch(store: &JsonDirStore, id: u64) -> Result<FileRecord> {
    store
        .get_file_record(id)
        .with_context(|| format!("cannot load record {id}"))
}

fn parse_value(raw: &str) -> FieldValue {
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    FieldValue::from(value)
}

fn summary(record: &FileRecord) -> String {
    let id = record.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "{id}\t{}\t{}\t{}\t{}",
        record.status,
        record.kind,
        record.uploader,
        record.path.display()
    )
}
