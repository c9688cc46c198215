//! `mops status` command implementation

use super::print_json;
use crate::config::ServiceConfig;
use crate::error::Result;
use mops_jobs::status::{get_status_manager, PublishOptions, WriteMode};
use serde_json::json;
use std::path::Path;
use tracing::info;

pub async fn publish(
    config: &ServiceConfig,
    asset_id: &str,
    state: &str,
    complete: bool,
    digest: Option<String>,
    digest_file: Option<&Path>,
    refresh: bool,
) -> Result<()> {
    let digest = match (digest, digest_file) {
        (Some(d), _) => Some(d),
        (None, Some(path)) => Some(mops_common::digest::sha256_file(path)?),
        (None, None) => None,
    };

    let mut options = PublishOptions::new().complete(complete);
    if let Some(digest) = digest {
        options = options.digest(digest);
    }
    if refresh {
        options = options.mode(WriteMode::RefreshTimestamp);
    }

    let manager = get_status_manager(config.status_manager()?).await?;
    let outcome = manager.publish_status(state, asset_id, options).await?;
    info!(asset_id, state, ?outcome, "Status published");

    print_json(&json!({
        "asset_id": asset_id,
        "state": state,
        "outcome": outcome,
    }))
}

/// Prints `null` when the asset has no status
pub async fn last(config: &ServiceConfig, asset_id: &str) -> Result<()> {
    let manager = get_status_manager(config.status_manager()?).await?;
    let snapshot = manager.get_last_status(asset_id).await?;
    print_json(&snapshot)
}

pub async fn list(config: &ServiceConfig) -> Result<()> {
    let manager = get_status_manager(config.status_manager()?).await?;
    let statuses = manager.get_status().await?;
    info!(count = statuses.len(), kind = %manager.kind(), "Statuses listed");
    print_json(&statuses)
}
