//! Status manager backed by a DynamoDB table
//!
//! One item per job, keyed by `"{job_type}-{asset_id}"`. The table is created
//! on construction when it does not exist, and construction waits until it
//! is active.

use crate::error::Result;
use crate::status::config::{BackendKind, DynamoDbConfig};
use crate::status::manager::StatusManager;
use crate::status::table::{DynamoStatusTable, StatusTable};
use crate::status::types::{
    job_id, now_timestamp, PublishOptions, PublishOutcome, StatusMap, StatusRecord, StatusSnapshot,
    WriteMode,
};
use async_trait::async_trait;
use mops_aws::{AwsClientFactory, DynamoAccessor};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct DynamoDbStatus {
    table: Arc<dyn StatusTable>,
    job_type: String,
}

impl DynamoDbStatus {
    /// Wrap a status table, creating it when missing and waiting for it to
    /// become active
    pub async fn new(table: Arc<dyn StatusTable>, job_type: impl Into<String>) -> Result<Self> {
        table.ensure().await?;
        info!(table = table.table_name(), "Status table ready");

        Ok(Self {
            table,
            job_type: job_type.into(),
        })
    }

    pub async fn from_config(config: &DynamoDbConfig) -> Result<Self> {
        let settings = config.validate()?;

        let factory = AwsClientFactory::new(Some(settings.aws_details)).await?;
        let accessor = DynamoAccessor::new(factory.dynamodb());
        let table = DynamoStatusTable::new(accessor, settings.table_name);

        Self::new(Arc::new(table), settings.body.job_type.clone()).await
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    fn prefix(&self) -> String {
        format!("{}-", self.job_type)
    }
}

#[async_trait]
impl StatusManager for DynamoDbStatus {
    fn kind(&self) -> BackendKind {
        BackendKind::DynamoDb
    }

    #[instrument(skip(self, options), fields(table = self.table.table_name(), mode = ?options.mode))]
    async fn publish_status(
        &self,
        state: &str,
        asset_id: &str,
        options: PublishOptions,
    ) -> Result<PublishOutcome> {
        let id = job_id(&self.job_type, asset_id);
        let time_stamp = now_timestamp();

        match options.mode {
            WriteMode::Put => {
                let record = StatusRecord {
                    id,
                    asset_id: asset_id.to_string(),
                    complete: options.complete,
                    digest: options.digest,
                    state: state.to_string(),
                    time_stamp,
                };

                let outcome = if self.table.put(&record).await? {
                    PublishOutcome::Replaced
                } else {
                    PublishOutcome::Inserted
                };
                debug!(?outcome, "Status stored");
                Ok(outcome)
            },
            WriteMode::RefreshTimestamp => {
                self.table
                    .refresh(&id, &time_stamp, options.digest.as_deref())
                    .await?;
                debug!("Status timestamp refreshed");
                Ok(PublishOutcome::Refreshed)
            },
        }
    }

    async fn get_last_status(&self, asset_id: &str) -> Result<Option<StatusSnapshot>> {
        let id = job_id(&self.job_type, asset_id);

        Ok(self.table.get(&id).await?.map(|record| {
            let mut snapshot = record.snapshot();
            snapshot.asset_id = asset_id.to_string();
            snapshot
        }))
    }

    async fn get_status(&self) -> Result<StatusMap> {
        let prefix = self.prefix();

        Ok(self
            .table
            .scan()
            .await?
            .into_iter()
            .filter_map(|record| {
                let asset_id = record.id.strip_prefix(&prefix)?.to_string();
                let mut snapshot = record.snapshot();
                snapshot.asset_id = asset_id.clone();
                Some((asset_id, snapshot))
            })
            .collect())
    }
}
