//! # Temporal Types: UTC Timestamps
//!
//! `Timestamp` is the normalized form of every `datetime` field in a
//! metadata record: UTC, truncated to seconds, rendered as
//! `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! Ingestion is lenient because metadata files are hand-written. Accepted
//! inputs, tried in order:
//!
//! 1. RFC 3339 with any offset (`2025-03-01T09:30:00+01:00`), converted to UTC.
//! 2. Naive date-time without offset (`2025-03-01T09:30:00`, optional
//!    fractional seconds, `T` or space separator), taken as UTC.
//! 3. Date only (`2025-03-01`), taken as midnight UTC.
//!
//! Output is always the single canonical form, so a normalized record
//! re-validates to itself.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CurateError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an ISO-8601 timestamp in any of the accepted shapes.
    ///
    /// # Errors
    ///
    /// Returns [`CurateError::InvalidTimestamp`] if the input matches none
    /// of the accepted shapes.
    pub fn parse(s: &str) -> Result<Self, CurateError> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_utc(dt.with_timezone(&Utc)));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self::from_utc(naive.and_utc()));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self::from_utc(midnight.and_utc()));
            }
        }

        Err(CurateError::InvalidTimestamp(format!(
            "{s:?} is not an ISO-8601 date or date-time"
        )))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO-8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
