//! Status manager configuration
//!
//! Mirrors the `status_manager` section of a service configuration:
//!
//! ```json
//! {
//!   "status_manager": {
//!     "type": "chicane",
//!     "url": "https://chicane.example/api/status",
//!     "get_agents_url": "https://chicane.example/api/agents",
//!     "body": {"id": "transcoder-eu", "type": "transcode"}
//!   }
//! }
//! ```
//!
//! The backend kind is a closed set resolved when the configuration is
//! loaded; an unknown `type` is rejected right there.

use crate::error::{JobsError, Result};
use crate::http::HttpSettings;
use mops_aws::AwsDetails;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Template for every status envelope sent by this service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBody {
    /// Agent name; also the envelope `id`
    pub id: String,

    /// Job type, the prefix of every job id
    #[serde(rename = "type")]
    pub job_type: String,

    /// Any further template fields, copied into each envelope verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusBody {
    pub fn new(id: impl Into<String>, job_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            job_type: job_type.into(),
            extra: Map::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(JobsError::config("status_manager.body.id cannot be empty"));
        }
        if self.job_type.trim().is_empty() {
            return Err(JobsError::config("status_manager.body.type cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChicaneConfig {
    pub url: Option<String>,
    pub get_agents_url: Option<String>,
    pub body: Option<StatusBody>,

    /// Share the process-wide history cache instead of a private one
    #[serde(default)]
    pub shared_cache: bool,

    /// History freshness override in seconds; not allowed with `shared_cache`
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    #[serde(default)]
    pub http: HttpSettings,
}

/// Validated Chicane settings
#[derive(Debug, Clone)]
pub struct ChicaneSettings<'a> {
    pub url: &'a str,
    pub get_agents_url: &'a str,
    pub body: &'a StatusBody,
}

impl ChicaneConfig {
    pub fn validate(&self) -> Result<ChicaneSettings<'_>> {
        let url = non_empty(self.url.as_deref(), "status_manager.url")?;
        let get_agents_url = non_empty(self.get_agents_url.as_deref(), "status_manager.get_agents_url")?;
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| JobsError::config("status_manager.body is required"))?;
        body.validate()?;

        if self.shared_cache && self.cache_ttl_secs.is_some() {
            return Err(JobsError::config(
                "status_manager.cache_ttl_secs cannot be set with shared_cache; \
                 the shared history cache always uses the default TTL",
            ));
        }

        Ok(ChicaneSettings {
            url,
            get_agents_url,
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamoDbConfig {
    pub table_name: Option<String>,
    pub body: Option<StatusBody>,
    pub aws_details: Option<AwsDetails>,
}

/// Validated DynamoDB settings
#[derive(Debug, Clone)]
pub struct DynamoDbSettings<'a> {
    pub table_name: &'a str,
    pub body: &'a StatusBody,
    pub aws_details: &'a AwsDetails,
}

impl DynamoDbConfig {
    pub fn validate(&self) -> Result<DynamoDbSettings<'_>> {
        let (Some(aws_details), Some(table_name)) = (&self.aws_details, self.table_name.as_deref())
        else {
            return Err(JobsError::config(
                "Invalid DynamoDB status manager: both aws_details and table_name are required",
            ));
        };
        let table_name = non_empty(Some(table_name), "status_manager.table_name")?;
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| JobsError::config("status_manager.body is required"))?;
        body.validate()?;

        Ok(DynamoDbSettings {
            table_name,
            body,
            aws_details,
        })
    }
}

fn non_empty<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(JobsError::config(format!("{} is required", field))),
    }
}

/// Backend selection plus its settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StatusManagerConfig {
    Chicane(ChicaneConfig),
    Dynamodb(DynamoDbConfig),
}

impl StatusManagerConfig {
    /// Parse the `status_manager` object itself
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| JobsError::config(format!("Invalid status_manager section: {}", e)))
    }

    /// Build from a backend name and its options, rejecting unknown names.
    /// Names match exactly, as the `type` tag does in `from_value`.
    pub fn from_kind(kind: &str, options: Value) -> Result<Self> {
        let kind = BackendKind::from_str(kind)?;

        let mut object = match options {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(JobsError::config(format!(
                    "status_manager options must be an object, got {}",
                    other
                )))
            },
        };
        object.insert("type".to_string(), Value::String(kind.to_string()));

        Self::from_value(Value::Object(object))
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            StatusManagerConfig::Chicane(_) => BackendKind::Chicane,
            StatusManagerConfig::Dynamodb(_) => BackendKind::DynamoDb,
        }
    }

    pub fn body(&self) -> Option<&StatusBody> {
        match self {
            StatusManagerConfig::Chicane(c) => c.body.as_ref(),
            StatusManagerConfig::Dynamodb(c) => c.body.as_ref(),
        }
    }
}

/// The supported status backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    Chicane,
    DynamoDb,
}

impl FromStr for BackendKind {
    type Err = JobsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chicane" => Ok(BackendKind::Chicane),
            "dynamodb" => Ok(BackendKind::DynamoDb),
            other => Err(JobsError::config(format!(
                "Unknown status manager type '{}'. Expected 'chicane' or 'dynamodb'.",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Chicane => write!(f, "chicane"),
            BackendKind::DynamoDb => write!(f, "dynamodb"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chicane_section() {
        let config = StatusManagerConfig::from_value(json!({
            "type": "chicane",
            "url": "http://chicane/status",
            "get_agents_url": "http://chicane/agents",
            "body": {"id": "agent-1", "type": "transcode", "channel": "news"}
        }))
        .unwrap();

        assert_eq!(config.kind(), BackendKind::Chicane);
        let StatusManagerConfig::Chicane(chicane) = &config else {
            panic!("expected chicane config");
        };
        let settings = chicane.validate().unwrap();
        assert_eq!(settings.url, "http://chicane/status");
        assert_eq!(settings.body.job_type, "transcode");
        assert_eq!(settings.body.extra["channel"], "news");
        assert!(!chicane.shared_cache);
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let err = StatusManagerConfig::from_kind("unknown", json!({})).unwrap_err();
        assert!(matches!(err, JobsError::Config(_)));
        assert!(err.to_string().contains("unknown"));

        let err = StatusManagerConfig::from_value(json!({"type": "redis"})).unwrap_err();
        assert!(matches!(err, JobsError::Config(_)));
    }

    #[test]
    fn test_from_kind_builds_dynamodb() {
        let config = StatusManagerConfig::from_kind(
            "dynamodb",
            json!({
                "table_name": "job-status",
                "aws_details": {"region_name": "us-east-1"},
                "body": {"id": "agent-1", "type": "qc"}
            }),
        )
        .unwrap();
        assert_eq!(config.kind(), BackendKind::DynamoDb);
        assert_eq!(config.body().unwrap().job_type, "qc");
    }

    #[test]
    fn test_kind_names_match_exactly_on_both_paths() {
        let options = json!({
            "table_name": "job-status",
            "aws_details": {"region_name": "us-east-1"},
            "body": {"id": "agent-1", "type": "qc"}
        });

        for name in ["DynamoDB", "Chicane", " dynamodb"] {
            let err = StatusManagerConfig::from_kind(name, options.clone()).unwrap_err();
            assert!(matches!(err, JobsError::Config(_)), "{name}");

            let mut tagged = options.clone();
            tagged["type"] = json!(name);
            let err = StatusManagerConfig::from_value(tagged).unwrap_err();
            assert!(matches!(err, JobsError::Config(_)), "{name}");
        }

        assert_eq!("chicane".parse::<BackendKind>().unwrap(), BackendKind::Chicane);
        assert_eq!(BackendKind::DynamoDb.to_string().parse::<BackendKind>().unwrap(), BackendKind::DynamoDb);
    }

    #[test]
    fn test_shared_cache_rejects_ttl_override() {
        let config = StatusManagerConfig::from_value(json!({
            "type": "chicane",
            "url": "http://chicane/status",
            "get_agents_url": "http://chicane/agents",
            "body": {"id": "agent-1", "type": "transcode"},
            "shared_cache": true,
            "cache_ttl_secs": 5
        }))
        .unwrap();
        let StatusManagerConfig::Chicane(chicane) = &config else {
            panic!("expected chicane config");
        };

        let err = chicane.validate().unwrap_err();
        assert!(matches!(err, JobsError::Config(_)));
        assert!(err.to_string().contains("cache_ttl_secs"));

        let private = ChicaneConfig {
            shared_cache: false,
            ..chicane.clone()
        };
        assert!(private.validate().is_ok());
    }

    #[test]
    fn test_dynamodb_requires_table_and_aws_details() {
        let missing_table = DynamoDbConfig {
            table_name: None,
            body: Some(StatusBody::new("a", "t")),
            aws_details: Some(AwsDetails::default()),
        };
        assert!(matches!(missing_table.validate(), Err(JobsError::Config(_))));

        let missing_aws = DynamoDbConfig {
            table_name: Some("job-status".to_string()),
            body: Some(StatusBody::new("a", "t")),
            aws_details: None,
        };
        assert!(matches!(missing_aws.validate(), Err(JobsError::Config(_))));
    }

    #[test]
    fn test_chicane_requires_urls() {
        let config = ChicaneConfig {
            url: Some("http://chicane/status".to_string()),
            get_agents_url: Some("  ".to_string()),
            body: Some(StatusBody::new("a", "t")),
            shared_cache: false,
            cache_ttl_secs: None,
            http: HttpSettings::default(),
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("get_agents_url"));
    }

    #[test]
    fn test_body_serializes_template_fields() {
        let mut body = StatusBody::new("agent-1", "transcode");
        body.extra.insert("region".to_string(), json!("eu"));

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"id": "agent-1", "type": "transcode", "region": "eu"}));
    }
}
