//! `mops job` command implementation

use super::print_json;
use crate::config::ServiceConfig;
use crate::error::{CliError, Result};
use mops_jobs::{ContainerJob, MapsorClient};
use serde_json::{Map, Value};

fn client(config: &ServiceConfig) -> Result<MapsorClient> {
    Ok(MapsorClient::new(
        config.mapsor_details()?,
        &config.http_settings(),
    )?)
}

/// Parse `--extra` into payload fields
fn parse_extra(extra: Option<&str>) -> Result<Map<String, Value>> {
    match extra {
        None => Ok(Map::new()),
        Some(text) => match serde_json::from_str(text)? {
            Value::Object(map) => Ok(map),
            other => Err(CliError::config(format!(
                "--extra must be a JSON object, got {}",
                other
            ))),
        },
    }
}

pub async fn submit(
    config: &ServiceConfig,
    customer: &str,
    cloud: &str,
    region: &str,
    id: &str,
    extra: Option<&str>,
) -> Result<()> {
    let mut job = ContainerJob::new(customer, cloud, region, id);
    job.extra = parse_extra(extra)?;

    let response = client(config)?.submit_container_job(&job).await?;
    print_json(&response)
}

pub async fn status(config: &ServiceConfig, id: &str) -> Result<()> {
    print_json(&client(config)?.job_status(id).await?)
}

pub async fn cancel(config: &ServiceConfig, id: &str) -> Result<()> {
    print_json(&client(config)?.cancel_job(id).await?)
}

pub async fn retry(config: &ServiceConfig, id: &str) -> Result<()> {
    print_json(&client(config)?.retry_job(id).await?)
}

/// Logs are printed as-is
pub async fn logs(config: &ServiceConfig, id: &str) -> Result<()> {
    let logs = client(config)?.job_logs(id).await?;
    println!("{}", logs);
    Ok(())
}
