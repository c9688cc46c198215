//! Storage port for the table-backed status manager

mod dynamo;
mod memory;

pub use dynamo::DynamoStatusTable;
pub use memory::MemoryStatusTable;

use super::types::StatusRecord;
use crate::error::{JobsError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Primary key attribute of the status table
pub const STATUS_TABLE_KEY: &str = "id";

/// How long `ensure` waits for a table to become active
pub const TABLE_READY_TIMEOUT: Duration = Duration::from_secs(60);

const TABLE_READY_POLL: Duration = Duration::from_secs(1);

/// A key-value table of status records keyed by job id
#[async_trait]
pub trait StatusTable: Send + Sync {
    fn table_name(&self) -> &str;

    async fn exists(&self) -> Result<bool>;

    /// Create the table with `id` as its string hash key
    async fn create(&self) -> Result<()>;

    /// Whether the table accepts reads and writes
    async fn is_ready(&self) -> Result<bool>;

    async fn get(&self, job_id: &str) -> Result<Option<StatusRecord>>;

    /// Unconditional write; `true` when a record with the same id was replaced
    async fn put(&self, record: &StatusRecord) -> Result<bool>;

    /// Set `time_stamp`, and `digest` when given, leaving other fields alone.
    /// A missing record is created holding only those attributes.
    async fn refresh(&self, job_id: &str, time_stamp: &str, digest: Option<&str>) -> Result<()>;

    async fn scan(&self) -> Result<Vec<StatusRecord>>;

    /// Create the table when it does not exist yet, then wait until it is
    /// ready or `TABLE_READY_TIMEOUT` elapses
    async fn ensure(&self) -> Result<()> {
        if !self.exists().await? {
            self.create().await?;
            info!(table = self.table_name(), "Created status table");
        }

        let started = Instant::now();
        loop {
            if self.is_ready().await? {
                return Ok(());
            }

            let waited = started.elapsed();
            if waited >= TABLE_READY_TIMEOUT {
                return Err(JobsError::TableNotReady {
                    table: self.table_name().to_string(),
                    waited,
                });
            }

            debug!(table = self.table_name(), ?waited, "Waiting for status table");
            tokio::time::sleep(TABLE_READY_POLL).await;
        }
    }
}
