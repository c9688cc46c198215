//! Pooled HTTP client shared by the service wrappers
//!
//! `HttpRequests` owns one `reqwest::Client` (and its connection pool) for
//! as long as the owning wrapper lives. A response with an error status is
//! still a response: only transport failures become errors, unless the
//! caller asks for [`HttpRequests::send_checked`].

use crate::error::{JobsError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{header::CONTENT_TYPE, Client, Method, Response, Url};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error};

// ============================================================================
// HTTP Client Constants
// ============================================================================

/// Default request timeout in seconds.
/// Can be overridden via MOPS_HTTP_TIMEOUT_SECS.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl HttpSettings {
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("MOPS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Self { timeout_secs }
    }
}

/// Service root that endpoint paths are appended to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| JobsError::config(format!("Invalid URL '{}': {}", url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(JobsError::config(format!("URL '{}' cannot be a base", url)));
        }
        Ok(Self(parsed))
    }

    /// Append path segments, percent-encoding each one, so an id holding
    /// `/` or `?` stays a single segment
    pub fn join<I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.0.clone();
        url.path_segments_mut()
            .map_err(|_| JobsError::config(format!("URL '{}' cannot be a base", self.0)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
    /// One file sent as a multipart form part
    File {
        field: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// Headers, query parameters and body for one request
#[derive(Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub basic_auth: Option<(String, String)>,
    pub body: RequestBody,
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("basic_auth", &self.basic_auth.as_ref().map(|(user, _)| user))
            .field("body", &self.body)
            .finish()
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = RequestBody::Text(text.into());
        self
    }

    pub fn bytes(mut self, bytes: Vec<u8>) -> Self {
        self.body = RequestBody::Bytes(bytes);
        self
    }

    pub fn file(mut self, field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.body = RequestBody::File {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        };
        self
    }

    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((user.into(), password.into()));
        self
    }
}

pub struct HttpRequests {
    client: Client,
}

impl HttpRequests {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        debug!(timeout_secs = settings.timeout_secs, "HTTP client created");
        Ok(Self { client })
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.send(Method::GET, url, options).await
    }

    /// PUT defaults to a JSON content type when no headers are given
    pub async fn put(&self, url: &str, mut options: RequestOptions) -> Result<Response> {
        if options.headers.is_empty() {
            options = options.header(CONTENT_TYPE.as_str(), "application/json");
        }
        self.send(Method::PUT, url, options).await
    }

    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.send(Method::POST, url, options).await
    }

    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.send(Method::DELETE, url, options).await
    }

    pub async fn head(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.send(Method::HEAD, url, options).await
    }

    /// Send a request; any HTTP status is returned as `Ok`
    pub async fn send(&self, method: Method, url: &str, options: RequestOptions) -> Result<Response> {
        debug!(
            %method,
            url,
            params = ?options.params,
            headers = ?options.headers,
            "Sending HTTP request"
        );

        let mut request = self.client.request(method.clone(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.params.is_empty() {
            request = request.query(&options.params);
        }
        if let Some((user, password)) = &options.basic_auth {
            request = request.basic_auth(user, Some(password));
        }
        request = match options.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Text(text) => request.body(text),
            RequestBody::Bytes(bytes) => request.body(bytes),
            RequestBody::File {
                field,
                file_name,
                bytes,
            } => request.multipart(Form::new().part(field, Part::bytes(bytes).file_name(file_name))),
        };

        let started = Instant::now();
        let response = request.send().await.map_err(|err| {
            error!(%method, url, error = %err, "HTTP request failed");
            JobsError::Transport(err)
        })?;

        debug!(
            %method,
            url,
            status = %response.status(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            headers = ?response.headers(),
            "HTTP response received"
        );

        Ok(response)
    }

    /// Like [`send`](Self::send) but non-2xx statuses become
    /// [`JobsError::Remote`] carrying the response body.
    pub async fn send_checked(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let response = self.send(method, url, options).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(JobsError::remote(status, body))
    }
}
