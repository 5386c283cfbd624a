//! # File Record Lifecycle
//!
//! A [`FileRecord`] wraps one metadata record with its uploader, source
//! path, record kind, status and approval.
//!
//! ```text
//! Pending ──approve──▶ Approved (terminal)
//! ```
//!
//! The transition is one-way and logged. Metadata is persisted in its
//! JSON-safe form via the serialization bridge.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use curate_config::RecordKind;
use curate_core::{Record, Timestamp};

use crate::error::WorkflowError;

/// Review status of an uploaded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    /// Awaiting approval.
    Pending,
    /// Approved; terminal.
    Approved,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::Approved => f.write_str("APPROVED"),
        }
    }
}

/// One logged status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Status before.
    pub from: UploadStatus,
    /// Status after.
    pub to: UploadStatus,
    /// Who made the change.
    pub actor: String,
    /// When.
    pub timestamp: Timestamp,
}

/// An uploaded metadata record and its review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Store-assigned identifier; `None` until first saved.
    pub id: Option<u64>,
    /// Username of the uploader.
    pub uploader: String,
    /// Path the metadata was loaded from.
    pub path: PathBuf,
    /// Dataset or edition.
    pub kind: RecordKind,
    /// Canonical metadata.
    #[serde(with = "metadata_serde")]
    pub metadata: Record,
    /// Review status.
    pub status: UploadStatus,
    /// Username of the approver, once approved.
    pub approved_by: Option<String>,
    /// Upload time.
    pub created_at: Timestamp,
    /// Ordered status changes.
    #[serde(default)]
    pub transitions: Vec<StatusTransition>,
}

impl FileRecord {
    /// A new pending record.
    pub fn new(
        uploader: impl Into<String>,
        path: impl Into<PathBuf>,
        kind: RecordKind,
        metadata: Record,
    ) -> Self {
        Self {
            id: None,
            uploader: uploader.into(),
            path: path.into(),
            kind,
            metadata,
            status: UploadStatus::Pending,
            approved_by: None,
            created_at: Timestamp::now(),
            transitions: Vec::new(),
        }
    }

    /// Whether the record awaits approval.
    pub fn is_pending(&self) -> bool {
        self.status == UploadStatus::Pending
    }

    /// Mark the record approved by `approver` (PENDING → APPROVED).
    ///
    /// Role checks belong to the caller; this only enforces the lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidTransition`] unless the record is
    /// pending.
    pub fn approve(&mut self, approver: &str) -> Result<(), WorkflowError> {
        self.require_status(UploadStatus::Pending, UploadStatus::Approved)?;
        self.do_transition(UploadStatus::Approved, approver);
        self.approved_by = Some(approver.to_string());
        Ok(())
    }

    /// The record as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the encoder's error if serialization fails.
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn require_status(&self, expected: UploadStatus, target: UploadStatus) -> Result<(), WorkflowError> {
        if self.status != expected {
            return Err(WorkflowError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: UploadStatus, actor: &str) {
        self.transitions.push(StatusTransition {
            from: self.status,
            to,
            actor: actor.to_string(),
            timestamp: Timestamp::now(),
        });
        tracing::info!(id = ?self.id, from = %self.status, %to, actor, "record status changed");
        self.status = to;
    }
}

/// Metadata travels as JSON-safe primitives.
mod metadata_serde {
    use curate_core::{record_to_json, FieldValue, Record};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub(super) fn serialize<S: Serializer>(record: &Record, serializer: S) -> Result<S::Ok, S::Error> {
        record_to_json(record).serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Record, D::Error> {
        match FieldValue::from(Value::deserialize(deserializer)?) {
            FieldValue::Map(record) => Ok(record),
            other => Err(D::Error::custom(format!(
                "metadata must be an object, found {}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curate_core::FieldValue;

    fn record() -> FileRecord {
        let mut metadata = Record::new();
        metadata.insert("title".into(), FieldValue::from("Population"));
        FileRecord::new("ana", "data/pop.json", RecordKind::Dataset, metadata)
    }

    #[test]
    fn test_new_record_is_pending() {
        let r = record();
        assert!(r.is_pending());
        assert!(r.id.is_none());
        assert!(r.transitions.is_empty());
    }

    #[test]
    fn test_approve_once() {
        let mut r = record();
        r.approve("bo").unwrap();
        assert_eq!(r.status, UploadStatus::Approved);
        assert_eq!(r.approved_by.as_deref(), Some("bo"));
        assert_eq!(r.transitions.len(), 1);
        assert_eq!(r.transitions[0].from, UploadStatus::Pending);
    }

    #[test]
    fn test_approve_twice_rejected() {
        let mut r = record();
        r.approve("bo").unwrap();
        let err = r.approve("bo").unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                from: UploadStatus::Approved,
                to: UploadStatus::Approved
            }
        ));
        assert_eq!(r.transitions.len(), 1);
    }

    #[test]
    fn test_document_round_trip() {
        let mut r = record();
        r.id = Some(7);
        let doc = r.to_document().unwrap();
        assert_eq!(doc["kind"], "dataset");
        assert_eq!(doc["status"], "PENDING");
        assert_eq!(doc["metadata"]["title"], "Population");
        let back: FileRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(UploadStatus::Pending.to_string(), "PENDING");
    }
}
