//! Service configuration loading
//!
//! A service configuration is one JSON document. It may live in a local
//! file, in S3 (read with the credentials in `AWS_DETAILS`), or travel as an
//! encoded blob in `MOPS_CONFIG_BLOB`.

use crate::error::{CliError, Result};
use mops_aws::{AwsClientFactory, AwsDetails, S3Location, S3Objects};
use mops_jobs::status::StatusManagerConfig;
use mops_jobs::{HttpSettings, MapsorDetails};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, info};

/// Where the configuration document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    S3(S3Location),
    Blob(String),
}

impl ConfigSource {
    /// `location` wins over `blob`; at least one must be given
    pub fn resolve(location: Option<&str>, blob: Option<&str>) -> Result<Self> {
        match (location, blob) {
            (Some(loc), _) if S3Location::is_s3_uri(loc) => Ok(Self::S3(S3Location::parse(loc)?)),
            (Some(loc), _) => Ok(Self::File(PathBuf::from(loc))),
            (None, Some(blob)) if !blob.trim().is_empty() => Ok(Self::Blob(blob.to_string())),
            _ => Err(CliError::config("no configuration given")),
        }
    }

    pub async fn read(&self) -> Result<Value> {
        match self {
            ConfigSource::File(path) => {
                if !path.exists() {
                    return Err(CliError::FileNotFound(path.display().to_string()));
                }
                let text = tokio::fs::read_to_string(path).await?;
                Ok(serde_json::from_str(&text)?)
            },
            ConfigSource::S3(location) => {
                let details = AwsDetails::from_env()?;
                let factory = AwsClientFactory::new(details.as_ref()).await?;
                let text = S3Objects::new(factory.s3()).get_string(location).await?;
                info!(%location, "Configuration loaded from S3");
                Ok(serde_json::from_str(&text)?)
            },
            ConfigSource::Blob(blob) => Ok(mops_common::config_blob::decode(blob)?),
        }
    }
}

/// The sections of a service configuration this tool understands.
/// Anything else is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_manager: Option<StatusManagerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapsor_details: Option<MapsorDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSettings>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceConfig {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| CliError::config(e.to_string()))
    }

    pub async fn load(source: &ConfigSource) -> Result<Self> {
        debug!(?source, "Loading configuration");
        Self::from_value(source.read().await?)
    }

    pub fn status_manager(&self) -> Result<&StatusManagerConfig> {
        self.status_manager
            .as_ref()
            .ok_or(CliError::MissingSection("status_manager"))
    }

    pub fn mapsor_details(&self) -> Result<&MapsorDetails> {
        self.mapsor_details
            .as_ref()
            .ok_or(CliError::MissingSection("mapsor_details"))
    }

    /// HTTP settings from the document, else from `MOPS_HTTP_TIMEOUT_SECS`
    pub fn http_settings(&self) -> HttpSettings {
        self.http.clone().unwrap_or_else(HttpSettings::from_env)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_resolve_prefers_location() {
        assert_eq!(
            ConfigSource::resolve(Some("svc.json"), Some("blob")).unwrap(),
            ConfigSource::File(PathBuf::from("svc.json"))
        );
        assert!(matches!(
            ConfigSource::resolve(Some("s3://cfg/svc.json"), None).unwrap(),
            ConfigSource::S3(_)
        ));
        assert_eq!(
            ConfigSource::resolve(None, Some("blob")).unwrap(),
            ConfigSource::Blob("blob".to_string())
        );
        assert!(matches!(
            ConfigSource::resolve(None, Some("  ")),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_bad_s3_location() {
        assert!(matches!(
            ConfigSource::resolve(Some("s3://bucket-only"), None),
            Err(CliError::Aws(_))
        ));
    }

    #[tokio::test]
    async fn test_load_file_keeps_unknown_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({
                "mapsor_details": {"mapsor_url": "http://mapsor", "mapsor_key": "k"},
                "channel": "news"
            })
        )
        .unwrap();

        let source = ConfigSource::File(file.path().to_path_buf());
        let config = ServiceConfig::load(&source).await.unwrap();

        assert_eq!(config.mapsor_details().unwrap().mapsor_url, "http://mapsor");
        assert_eq!(config.extra["channel"], "news");
        assert!(matches!(
            config.status_manager(),
            Err(CliError::MissingSection("status_manager"))
        ));
    }

    #[tokio::test]
    async fn test_load_blob() {
        let document = json!({"http": {"timeout_secs": 5}});
        let blob = mops_common::config_blob::encode(&document).unwrap();

        let config = ServiceConfig::load(&ConfigSource::Blob(blob)).await.unwrap();
        assert_eq!(config.http_settings().timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = ConfigSource::File(PathBuf::from("/nonexistent/mops.json"));
        assert!(matches!(
            ServiceConfig::load(&source).await,
            Err(CliError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_status_backend_fails_at_load() {
        let result = ServiceConfig::from_value(json!({"status_manager": {"type": "redis"}}));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
