//! `mops config` command implementation

use super::print_json;
use crate::config::ServiceConfig;
use crate::error::{CliError, Result};
use mops_aws::{AwsClientFactory, AwsDetails, S3Location, S3Objects};
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

async fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Print the blob form of a JSON document
pub async fn encode(path: &Path) -> Result<()> {
    let document = read_document(path).await?;
    println!("{}", mops_common::config_blob::encode(&document)?);
    Ok(())
}

/// Store a configuration in S3 once it parses as a service configuration
pub async fn upload(path: &Path, location: &str, force: bool) -> Result<()> {
    let location = S3Location::parse(location)?;
    let document = read_document(path).await?;
    ServiceConfig::from_value(document.clone())?;

    let details = AwsDetails::from_env()?;
    let factory = AwsClientFactory::new(details.as_ref()).await?;
    let objects = S3Objects::new(factory.s3());

    if !force && objects.exists(&location).await? {
        return Err(CliError::config(format!(
            "{} already exists; pass --force to replace it",
            location
        )));
    }

    let data = serde_json::to_vec_pretty(&document)?;
    objects
        .put_bytes(&location, data, Some("application/json"))
        .await?;
    info!(%location, "Configuration uploaded");

    print_json(&json!({ "uploaded": location.to_string() }))
}

pub async fn decode(blob: Option<&str>) -> Result<()> {
    let blob = blob.ok_or_else(|| CliError::config("no blob given and MOPS_CONFIG_BLOB is not set"))?;
    let document: Value = mops_common::config_blob::decode(blob)?;
    print_json(&document)
}

/// Summarise which services a loaded configuration sets up
pub fn validate(config: &ServiceConfig) -> Result<()> {
    let status_manager = config.status_manager.as_ref().map(|sm| {
        json!({
            "type": sm.kind().to_string(),
            "job_type": sm.body().map(|b| b.job_type.as_str()),
        })
    });

    print_json(&json!({
        "status_manager": status_manager,
        "mapsor": config.mapsor_details.is_some(),
        "http_timeout_secs": config.http_settings().timeout_secs,
    }))
}
