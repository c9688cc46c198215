//! Client for the Mapsor container job dispatcher

use crate::error::{JobsError, Result};
use crate::http::{BaseUrl, HttpRequests, HttpSettings, RequestOptions};
use reqwest::{header, Method, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};

/// Endpoint and access token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapsorDetails {
    pub mapsor_url: String,
    pub mapsor_key: String,
}

impl std::fmt::Debug for MapsorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsorDetails")
            .field("mapsor_url", &self.mapsor_url)
            .field("mapsor_key", &"<redacted>")
            .finish()
    }
}

/// A container job to schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerJob {
    pub customer: String,
    pub cloud: String,
    pub region: String,
    pub id: String,

    /// Extra payload fields; they override the named ones on collision
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContainerJob {
    pub fn new(
        customer: impl Into<String>,
        cloud: impl Into<String>,
        region: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            customer: customer.into(),
            cloud: cloud.into(),
            region: region.into(),
            id: id.into(),
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    fn payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("cloud".to_string(), Value::String(self.cloud.clone()));
        payload.insert("region".to_string(), Value::String(self.region.clone()));
        payload.insert("id".to_string(), Value::String(self.id.clone()));
        payload.insert("customer".to_string(), Value::String(self.customer.clone()));
        payload.extend(self.extra.clone());
        Value::Object(payload)
    }
}

pub struct MapsorClient {
    http: HttpRequests,
    base_url: BaseUrl,
    token: String,
}

impl MapsorClient {
    pub fn new(details: &MapsorDetails, settings: &HttpSettings) -> Result<Self> {
        if details.mapsor_url.trim().is_empty() {
            return Err(JobsError::config("mapsor_url is required"));
        }

        Ok(Self {
            http: HttpRequests::new(settings)?,
            base_url: BaseUrl::parse(&details.mapsor_url)?,
            token: details.mapsor_key.clone(),
        })
    }

    fn options(&self) -> RequestOptions {
        RequestOptions::new()
            .header(header::ACCEPT.as_str(), "*/*")
            .param("token", &self.token)
    }

    async fn call(&self, method: Method, segments: &[&str], options: RequestOptions) -> Result<Response> {
        let url = self.base_url.join(segments)?;
        self.http.send_checked(method, url.as_str(), options).await
    }

    async fn json_response(response: Response) -> Result<Value> {
        let text = response.text().await?;
        info!(response = %text, "Response from Mapsor");
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| JobsError::parse(format!("Mapsor response: {}", e)))
    }

    #[instrument(skip(self, job), fields(id = %job.id, customer = %job.customer))]
    pub async fn submit_container_job(&self, job: &ContainerJob) -> Result<Value> {
        let options = self.options().json(job.payload());
        let response = self.call(Method::POST, &["submit"], options).await?;
        Self::json_response(response).await
    }

    #[instrument(skip(self))]
    pub async fn job_status(&self, id: &str) -> Result<Value> {
        let response = self.call(Method::GET, &["status", id], self.options()).await?;
        Self::json_response(response).await
    }

    #[instrument(skip(self))]
    pub async fn cancel_job(&self, id: &str) -> Result<Value> {
        let response = self.call(Method::GET, &["cancel", id], self.options()).await?;
        Self::json_response(response).await
    }

    #[instrument(skip(self))]
    pub async fn retry_job(&self, id: &str) -> Result<Value> {
        let response = self.call(Method::GET, &["retry", id], self.options()).await?;
        Self::json_response(response).await
    }

    /// Job logs as plain text
    #[instrument(skip(self))]
    pub async fn job_logs(&self, id: &str) -> Result<String> {
        let response = self.call(Method::GET, &["logs", id], self.options()).await?;
        Ok(response.text().await?)
    }
}
