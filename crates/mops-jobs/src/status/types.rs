//! Status record types shared by both backends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Second-precision UTC timestamp format used on stored records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// `"{job_type}-{asset_id}"`, the key that ties a status to one job and asset
pub fn job_id(job_type: &str, asset_id: &str) -> String {
    format!("{}-{}", job_type, asset_id)
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// How the table backend writes a publication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write the full record, overwriting whatever has the same key
    #[default]
    Put,
    /// Touch only `time_stamp` (and `digest` when one is given).
    /// `state` and `complete` keep their stored values.
    RefreshTimestamp,
}

/// Optional arguments to `publish_status`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub complete: bool,
    pub digest: Option<String>,
    pub mode: WriteMode,
}

impl PublishOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }

    pub fn digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    pub fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }
}

/// What a successful publication did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The status service accepted the update
    Accepted,
    /// A new record was written
    Inserted,
    /// An existing record with the same job id was overwritten
    Replaced,
    /// Timestamp (and digest) of the record were refreshed in place
    Refreshed,
}

/// Latest known status of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub asset_id: String,
    pub timestamp: String,
    pub digest: Option<String>,
    /// Only known to backends that store the full record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

/// Statuses keyed by asset id
pub type StatusMap = BTreeMap<String, StatusSnapshot>;

/// One row of the status table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    pub asset_id: String,
    pub complete: bool,
    pub digest: Option<String>,
    pub state: String,
    pub time_stamp: String,
}

impl StatusRecord {
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            asset_id: self.asset_id.clone(),
            timestamp: self.time_stamp.clone(),
            digest: self.digest.clone(),
            state: Some(self.state.clone()),
            complete: Some(self.complete),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_job_id() {
        assert_eq!(job_id("transcode", "42"), "transcode-42");
        assert_eq!(job_id("qc", "a-b"), "qc-a-b");
    }

    #[test]
    fn test_timestamp_is_second_precision_utc() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(at), "2024-03-09T07:05:01Z");
    }

    #[test]
    fn test_publish_options_builder() {
        let options = PublishOptions::new()
            .complete(true)
            .digest("d41d8cd9")
            .mode(WriteMode::RefreshTimestamp);

        assert!(options.complete);
        assert_eq!(options.digest.as_deref(), Some("d41d8cd9"));
        assert_eq!(options.mode, WriteMode::RefreshTimestamp);
        assert_eq!(PublishOptions::default().mode, WriteMode::Put);
    }
}
