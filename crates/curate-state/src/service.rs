//! # Upload and Approval Services
//!
//! [`UploadService`] turns metadata files into pending [`FileRecord`]s and
//! applies edits; every load and edit runs through a [`MetadataConfig`]
//! for the record's kind, so stored metadata is always canonical.
//! [`ApprovalService`] moves pending records to approved.
//!
//! The upload service owns the [`ModelCompiler`], so the dataset and
//! edition models are compiled once per service. A kind's built-in schema
//! can be replaced with [`UploadService::with_schema`].

use std::collections::HashMap;
use std::path::Path;

use curate_config::{MetadataConfig, RecordKind};
use serde_json::Value;

use curate_core::{FieldValue, Record};
use curate_schema::ModelCompiler;

use crate::error::WorkflowError;
use crate::record::FileRecord;
use crate::store::RecordStore;
use crate::user::{Action, User};

fn require(user: &User, action: Action) -> Result<(), WorkflowError> {
    if user.has_permission(action) {
        return Ok(());
    }
    tracing::warn!(user = %user.username, role = %user.role, %action, "permission denied");
    Err(WorkflowError::PermissionDenied {
        user: user.username.clone(),
        action,
    })
}

/// Uploads and edits metadata records.
#[derive(Debug, Default)]
pub struct UploadService {
    compiler: ModelCompiler,
    schemas: HashMap<RecordKind, Value>,
}

impl UploadService {
    /// A service with a fresh model cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `kind` records against `schema` instead of the built-in
    /// description.
    pub fn with_schema(mut self, kind: RecordKind, schema: Value) -> Self {
        self.schemas.insert(kind, schema);
        self
    }

    fn config(&mut self, kind: RecordKind) -> Result<MetadataConfig, WorkflowError> {
        let config = match self.schemas.get(&kind) {
            Some(schema) => MetadataConfig::with_schema(kind, schema, &mut self.compiler)?,
            None => MetadataConfig::new(kind, &mut self.compiler)?,
        };
        Ok(config)
    }

    /// Load `path` as `kind` metadata and wrap it in a pending record.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::PermissionDenied`] if the user may not
    /// upload, or [`WorkflowError::Config`] if the file is missing,
    /// malformed or invalid.
    pub fn upload(&mut self, user: &User, path: &Path, kind: RecordKind) -> Result<FileRecord, WorkflowError> {
        require(user, Action::Upload)?;
        let mut config = self.config(kind)?;
        config.load(path)?;
        tracing::info!(user = %user.username, %kind, path = %path.display(), "uploaded metadata");
        Ok(FileRecord::new(
            user.username.clone(),
            path,
            kind,
            config.into_metadata(),
        ))
    }

    /// Upload dataset metadata.
    ///
    /// # Errors
    ///
    /// As [`upload`](Self::upload).
    pub fn upload_dataset(&mut self, user: &User, path: &Path) -> Result<FileRecord, WorkflowError> {
        self.upload(user, path, RecordKind::Dataset)
    }

    /// Upload edition metadata.
    ///
    /// # Errors
    ///
    /// As [`upload`](Self::upload).
    pub fn upload_edition(&mut self, user: &User, path: &Path) -> Result<FileRecord, WorkflowError> {
        self.upload(user, path, RecordKind::Edition)
    }

    /// The record's metadata.
    pub fn preview<'r>(&self, record: &'r FileRecord) -> &'r Record {
        &record.metadata
    }

    /// Replace a record's metadata with `new_data` after validating it as
    /// the record's kind. The record is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::PermissionDenied`] or
    /// [`WorkflowError::Config`].
    pub fn edit_metadata<'r>(
        &mut self,
        user: &User,
        record: &'r mut FileRecord,
        new_data: &Record,
    ) -> Result<&'r Record, WorkflowError> {
        require(user, Action::Upload)?;
        let mut config = self.config(record.kind)?;
        config.import(new_data)?;
        record.metadata = config.into_metadata();
        tracing::info!(user = %user.username, id = ?record.id, "edited metadata");
        Ok(&record.metadata)
    }

    /// Assign one field of a record's metadata and re-validate. The record
    /// is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::PermissionDenied`] or
    /// [`WorkflowError::Config`] (unknown key, invalid value, missing file).
    pub fn set_field(
        &mut self,
        user: &User,
        record: &mut FileRecord,
        key: &str,
        value: FieldValue,
    ) -> Result<(), WorkflowError> {
        require(user, Action::Upload)?;
        let mut config = self.config(record.kind)?;
        config.import(&record.metadata)?;
        config.set(key, value)?;
        record.metadata = config.into_metadata();
        tracing::info!(user = %user.username, id = ?record.id, key, "edited field");
        Ok(())
    }

    /// Persist a record: add it if new, update it otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Store`] if persistence fails.
    pub fn save(&self, store: &mut dyn RecordStore, record: &mut FileRecord) -> Result<u64, WorkflowError> {
        match record.id {
            Some(id) => {
                store.update_file_record(record)?;
                Ok(id)
            }
            None => Ok(store.add_file_record(record)?),
        }
    }
}

/// Approves pending records.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApprovalService;

impl ApprovalService {
    /// A new service.
    pub fn new() -> Self {
        Self
    }

    /// Approve `record` as `approver`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::PermissionDenied`] unless the approver has
    /// the approver role, or [`WorkflowError::InvalidTransition`] unless
    /// the record is pending.
    pub fn approve(&self, record: &mut FileRecord, approver: &User) -> Result<(), WorkflowError> {
        require(approver, Action::Approve)?;
        record.approve(&approver.username)
    }
}
