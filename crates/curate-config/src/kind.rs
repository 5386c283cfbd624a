//! Record kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use curate_core::DocumentError;
use curate_schema::{dataset_schema, edition_schema, DATASET_MODEL, EDITION_MODEL};

use crate::error::ConfigError;

/// Which kind of metadata a record carries.
///
/// Stored beside the metadata, never inside it, so that re-validating the
/// metadata cannot lose or corrupt it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Dataset-level metadata.
    Dataset,
    /// Edition-level metadata.
    Edition,
}

impl RecordKind {
    /// Both kinds.
    pub const ALL: [Self; 2] = [Self::Dataset, Self::Edition];

    /// Lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Edition => "edition",
        }
    }

    /// Name the kind's schema is compiled under.
    pub fn model_name(self) -> &'static str {
        match self {
            Self::Dataset => DATASET_MODEL,
            Self::Edition => EDITION_MODEL,
        }
    }

    /// The kind's built-in schema description.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] if the embedded schema is malformed.
    pub fn builtin_schema(self) -> Result<Value, DocumentError> {
        match self {
            Self::Dataset => dataset_schema(),
            Self::Edition => edition_schema(),
        }
    }

    /// Whether this is edition metadata.
    pub fn is_edition(self) -> bool {
        self == Self::Edition
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dataset" => Ok(Self::Dataset),
            "edition" => Ok(Self::Edition),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_identifiers() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
        }
        assert!("Dataset".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&RecordKind::Edition).unwrap(), "\"edition\"");
    }

    #[test]
    fn test_model_names() {
        assert_eq!(RecordKind::Dataset.model_name(), "DatasetModel");
        assert!(RecordKind::Edition.is_edition());
        assert!(RecordKind::Edition.builtin_schema().unwrap().get("edition_title").is_some());
    }
}
