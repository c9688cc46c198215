//! The status manager interface and its factory

use super::backend::{ChicaneStatus, DynamoDbStatus};
use super::config::{BackendKind, StatusManagerConfig};
use super::types::{PublishOptions, PublishOutcome, StatusMap, StatusSnapshot};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Publishes job status for assets and reads it back.
///
/// Implementations hold the job type and agent identity they were built
/// with; every call is scoped to that job type.
#[async_trait]
pub trait StatusManager: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Record `state` for `asset_id`
    async fn publish_status(
        &self,
        state: &str,
        asset_id: &str,
        options: PublishOptions,
    ) -> Result<PublishOutcome>;

    /// Latest status of one asset, `None` when it has never been published
    async fn get_last_status(&self, asset_id: &str) -> Result<Option<StatusSnapshot>>;

    /// Every known status for this job type, keyed by asset id
    async fn get_status(&self) -> Result<StatusMap>;
}

/// Build the backend a configuration names
pub async fn get_status_manager(config: &StatusManagerConfig) -> Result<Box<dyn StatusManager>> {
    info!(kind = %config.kind(), "Creating status manager");

    let manager: Box<dyn StatusManager> = match config {
        StatusManagerConfig::Chicane(chicane) => Box::new(ChicaneStatus::from_config(chicane).await?),
        StatusManagerConfig::Dynamodb(dynamo) => Box::new(DynamoDbStatus::from_config(dynamo).await?),
    };
    Ok(manager)
}

/// Build a backend from its name and raw options; unknown names are a
/// configuration error.
pub async fn get_status_manager_by_kind(kind: &str, options: Value) -> Result<Box<dyn StatusManager>> {
    let config = StatusManagerConfig::from_kind(kind, options)?;
    get_status_manager(&config).await
}
