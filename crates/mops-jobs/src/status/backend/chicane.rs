//! Status manager backed by the Chicane status service
//!
//! Chicane keeps a per-agent history of job status envelopes. On start the
//! agent named in the envelope template is looked up and registered when
//! missing. Publishing POSTs a one-element array of envelopes; reads go
//! through the [`HistoryCache`] so that a burst of lookups costs one fetch.

use crate::error::{JobsError, Result};
use crate::http::{HttpRequests, HttpSettings, RequestOptions};
use crate::status::cache::{HistoryCache, HistoryEntry};
use crate::status::config::{BackendKind, ChicaneConfig, StatusBody};
use crate::status::manager::StatusManager;
use crate::status::types::{job_id, PublishOptions, PublishOutcome, StatusMap, StatusSnapshot};
use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Outcome of the start-up agent lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRegistration {
    Existing,
    Created,
}

#[derive(Debug, Deserialize)]
struct Agent {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RemoteStatus {
    #[serde(default)]
    history: Option<Vec<RemoteHistory>>,
}

#[derive(Debug, Deserialize)]
struct RemoteHistory {
    #[serde(rename = "job-id")]
    job_id: String,
    timestamp: Value,
    #[serde(default)]
    additional_info: Option<AdditionalInfo>,
}

#[derive(Debug, Deserialize)]
struct AdditionalInfo {
    #[serde(default)]
    digest: Option<String>,
}

fn timestamp_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

pub struct ChicaneStatus {
    http: HttpRequests,
    url: String,
    body: StatusBody,
    job_pattern: Regex,
    cache: Arc<HistoryCache>,
    registration: AgentRegistration,
}

impl ChicaneStatus {
    /// Validate the configuration, pick a history cache and register the agent
    pub async fn from_config(config: &ChicaneConfig) -> Result<Self> {
        config.validate()?;

        let cache = if config.shared_cache {
            HistoryCache::shared()
        } else {
            let ttl = config
                .cache_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(crate::status::cache::DEFAULT_HISTORY_TTL);
            Arc::new(HistoryCache::with_ttl(ttl))
        };

        Self::connect(config, cache).await
    }

    /// Like [`from_config`](Self::from_config) with an injected cache
    pub async fn connect(config: &ChicaneConfig, cache: Arc<HistoryCache>) -> Result<Self> {
        let settings = config.validate()?;
        let http = HttpRequests::new(&config.http)?;

        let pattern = format!("{}-(.*)", regex::escape(&settings.body.job_type));
        let job_pattern = Regex::new(&pattern)
            .map_err(|e| JobsError::config(format!("Invalid job type pattern: {}", e)))?;

        let registration =
            register_agent(&http, settings.get_agents_url, &settings.body.id).await?;

        Ok(Self {
            http,
            url: settings.url.to_string(),
            body: settings.body.clone(),
            job_pattern,
            cache,
            registration,
        })
    }

    pub fn registration(&self) -> AgentRegistration {
        self.registration
    }

    pub fn cache(&self) -> &Arc<HistoryCache> {
        &self.cache
    }

    /// Copy of the template with the per-publication fields filled in
    fn envelope(&self, state: &str, asset_id: &str, digest: Option<&str>) -> Result<Value> {
        let mut envelope = match serde_json::to_value(&self.body)? {
            Value::Object(map) => map,
            other => {
                return Err(JobsError::config(format!(
                    "status body must serialize to an object, got {}",
                    other
                )))
            },
        };

        envelope.insert("state".to_string(), json!(state));
        envelope.insert("asset-id".to_string(), json!(asset_id));
        envelope.insert(
            "job-id".to_string(),
            json!(job_id(&self.body.job_type, asset_id)),
        );
        if let Some(digest) = digest.filter(|d| !d.is_empty()) {
            envelope.insert("additional_info".to_string(), json!({ "digest": digest }));
        }

        Ok(Value::Object(envelope))
    }

    /// Asset id embedded in a job id of this job type
    fn asset_id_of<'a>(&self, job_id: &'a str) -> Option<&'a str> {
        self.job_pattern
            .captures(job_id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Fetch the remote history. `None` when the service has nothing.
    async fn fetch_history(&self) -> Result<Option<Vec<(String, HistoryEntry)>>> {
        let response = self.http.get(&self.url, RequestOptions::new()).await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(%status, "Status history request rejected");
            return Err(JobsError::remote(status, text));
        }

        let statuses: Option<Vec<RemoteStatus>> = serde_json::from_str(&text)
            .map_err(|e| JobsError::parse(format!("status history: {}", e)))?;

        let statuses = match statuses {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(None),
        };

        let mut entries = Vec::new();
        for history in statuses.into_iter().filter_map(|s| s.history).flatten() {
            let Some(asset_id) = self.asset_id_of(&history.job_id) else {
                debug!(job_id = %history.job_id, "Skipping history entry of another job type");
                continue;
            };

            entries.push((
                asset_id.to_string(),
                HistoryEntry {
                    timestamp: timestamp_text(history.timestamp),
                    digest: history.additional_info.and_then(|info| info.digest),
                },
            ));
        }

        Ok(Some(entries))
    }
}

/// Find the agent by name, creating it when the list does not contain it
#[instrument(skip(http))]
async fn register_agent(http: &HttpRequests, agents_url: &str, agent: &str) -> Result<AgentRegistration> {
    let response = http.get(agents_url, RequestOptions::new()).await?;
    let status = response.status();

    if status == StatusCode::OK {
        let agents: Vec<Agent> = response
            .json()
            .await
            .map_err(|e| JobsError::parse(format!("agent list: {}", e)))?;

        if agents.iter().any(|a| a.name == agent) {
            debug!("Agent already registered");
            return Ok(AgentRegistration::Existing);
        }
    } else {
        warn!(%status, "Agent list unavailable, trying to register anyway");
    }

    let options = RequestOptions::new().json(json!({ "name": agent, "code": agent }));
    let response = http.post(agents_url, options).await?;
    let status = response.status();

    if status == StatusCode::CREATED {
        info!("Agent registered");
        Ok(AgentRegistration::Created)
    } else {
        warn!(%status, "Agent registration rejected");
        Err(JobsError::AgentRegistration {
            agent: agent.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl StatusManager for ChicaneStatus {
    fn kind(&self) -> BackendKind {
        BackendKind::Chicane
    }

    #[instrument(skip(self, options), fields(job_type = %self.body.job_type, complete = options.complete))]
    async fn publish_status(
        &self,
        state: &str,
        asset_id: &str,
        options: PublishOptions,
    ) -> Result<PublishOutcome> {
        let envelope = self.envelope(state, asset_id, options.digest.as_deref())?;

        let request = RequestOptions::new()
            .param("complete", options.complete)
            .json(Value::Array(vec![envelope]));
        let response = self.http.post(&self.url, request).await?;
        let status = response.status();

        if status == StatusCode::OK {
            debug!("Status accepted");
            return Ok(PublishOutcome::Accepted);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%status, body = %body, "Status update rejected");
        Err(JobsError::remote(status, body))
    }

    async fn get_last_status(&self, asset_id: &str) -> Result<Option<StatusSnapshot>> {
        let history = self.cache.get_or_refresh(|| self.fetch_history()).await?;

        Ok(history.get(asset_id).map(|entry| StatusSnapshot {
            asset_id: asset_id.to_string(),
            timestamp: entry.timestamp.clone(),
            digest: entry.digest.clone(),
            state: None,
            complete: None,
        }))
    }

    async fn get_status(&self) -> Result<StatusMap> {
        let history = self.cache.get_or_refresh(|| self.fetch_history()).await?;

        Ok(history
            .into_iter()
            .map(|(asset_id, entry)| {
                let snapshot = StatusSnapshot {
                    asset_id: asset_id.clone(),
                    timestamp: entry.timestamp,
                    digest: entry.digest,
                    state: None,
                    complete: None,
                };
                (asset_id, snapshot)
            })
            .collect())
    }
}
