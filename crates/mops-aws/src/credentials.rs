//! Credential resolution and AWS client construction
//!
//! Service configurations carry an optional `aws_details` object. The
//! credential source is picked once from that object by walking an ordered
//! strategy list; the first strategy whose fields are all present wins and
//! the SDK default provider chain is the final fallback:
//!
//! 1. static keys + `assigned_role_arn` → assume the role using the keys
//! 2. static keys + region → use the keys directly
//! 3. `profile_name` → named profile from the shared config files
//! 4. anything else → ambient credentials (env, IMDS, SSO, ...)

use crate::error::Result;
use aws_config::{sts::AssumeRoleProvider, BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Assumed-role session names are this prefix plus a random suffix
pub const ASSUME_ROLE_SESSION_PREFIX: &str = "mops-session";

/// Credential and region details as they appear in service configuration
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    /// Endpoint override, e.g. a local DynamoDB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

impl AwsDetails {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the `AWS_DETAILS` environment variable, if set
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var("AWS_DETAILS") {
            Ok(json) if !json.trim().is_empty() => Ok(Some(Self::from_json_str(&json)?)),
            _ => Ok(None),
        }
    }

    fn static_keys(&self) -> Option<StaticKeys> {
        Some(StaticKeys {
            access_key: self.access_key.clone()?,
            secret_key: self.secret_key.clone()?,
            region: self.region_name.clone()?,
        })
    }
}

impl std::fmt::Debug for AwsDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsDetails")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("region_name", &self.region_name)
            .field("assigned_role_arn", &self.assigned_role_arn)
            .field("profile_name", &self.profile_name)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct StaticKeys {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

impl StaticKeys {
    fn credentials(&self) -> Credentials {
        Credentials::new(
            &self.access_key,
            &self.secret_key,
            None,
            None,
            "mops-static",
        )
    }
}

impl std::fmt::Debug for StaticKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeys")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// The credential strategy selected for a client factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    AssumeRole { keys: StaticKeys, role_arn: String },
    Static(StaticKeys),
    Profile { name: String, region: Option<String> },
    Ambient { region: Option<String> },
}

type Strategy = fn(&AwsDetails) -> Option<CredentialSource>;

const STRATEGIES: [Strategy; 3] = [assume_role, static_keys, profile];

fn assume_role(details: &AwsDetails) -> Option<CredentialSource> {
    Some(CredentialSource::AssumeRole {
        keys: details.static_keys()?,
        role_arn: details.assigned_role_arn.clone()?,
    })
}

fn static_keys(details: &AwsDetails) -> Option<CredentialSource> {
    details.static_keys().map(CredentialSource::Static)
}

fn profile(details: &AwsDetails) -> Option<CredentialSource> {
    Some(CredentialSource::Profile {
        name: details.profile_name.clone()?,
        region: details.region_name.clone(),
    })
}

impl CredentialSource {
    /// Pick the first matching strategy, falling back to ambient credentials
    pub fn resolve(details: Option<&AwsDetails>) -> Self {
        let Some(details) = details else {
            return CredentialSource::Ambient { region: None };
        };

        if let Some(source) = STRATEGIES.iter().find_map(|strategy| strategy(details)) {
            return source;
        }

        if details.access_key.is_some() || details.secret_key.is_some() {
            warn!("Incomplete static AWS keys (need access_key, secret_key and region_name); using ambient credentials");
        }

        CredentialSource::Ambient {
            region: details.region_name.clone(),
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            CredentialSource::AssumeRole { keys, .. } | CredentialSource::Static(keys) => {
                Some(&keys.region)
            },
            CredentialSource::Profile { region, .. } | CredentialSource::Ambient { region } => {
                region.as_deref()
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CredentialSource::AssumeRole { .. } => "assume-role",
            CredentialSource::Static(_) => "static",
            CredentialSource::Profile { .. } => "profile",
            CredentialSource::Ambient { .. } => "ambient",
        }
    }
}

/// Builds one shared SDK configuration and hands out service clients
#[derive(Clone)]
pub struct AwsClientFactory {
    sdk_config: SdkConfig,
    source: CredentialSource,
}

impl AwsClientFactory {
    pub async fn new(details: Option<&AwsDetails>) -> Result<Self> {
        let source = CredentialSource::resolve(details);
        let endpoint = details.and_then(|d| d.endpoint_url.clone());

        debug!(source = source.name(), region = ?source.region(), "Resolving AWS credentials");

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = source.region() {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        loader = match &source {
            CredentialSource::AssumeRole { keys, role_arn } => {
                let base = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(keys.region.clone()))
                    .credentials_provider(keys.credentials())
                    .load()
                    .await;

                let provider = AssumeRoleProvider::builder(role_arn.clone())
                    .session_name(format!("{}-{}", ASSUME_ROLE_SESSION_PREFIX, Uuid::new_v4().simple()))
                    .configure(&base)
                    .build()
                    .await;

                loader.credentials_provider(provider)
            },
            CredentialSource::Static(keys) => loader.credentials_provider(keys.credentials()),
            CredentialSource::Profile { name, .. } => loader.profile_name(name),
            CredentialSource::Ambient { .. } => loader,
        };

        let sdk_config = loader.load().await;

        info!(source = source.name(), "AWS client factory initialized");

        Ok(Self { sdk_config, source })
    }

    pub fn dynamodb(&self) -> aws_sdk_dynamodb::Client {
        aws_sdk_dynamodb::Client::new(&self.sdk_config)
    }

    pub fn s3(&self) -> aws_sdk_s3::Client {
        aws_sdk_s3::Client::new(&self.sdk_config)
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    pub fn credential_source(&self) -> &CredentialSource {
        &self.source
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn keys() -> AwsDetails {
        AwsDetails {
            access_key: Some("AKIA123".to_string()),
            secret_key: Some("shh".to_string()),
            region_name: Some("eu-west-1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_details_is_ambient() {
        assert_eq!(
            CredentialSource::resolve(None),
            CredentialSource::Ambient { region: None }
        );
    }

    #[test]
    fn test_role_wins_over_static_keys() {
        let details = AwsDetails {
            assigned_role_arn: Some("arn:aws:iam::123456789:role/cross".to_string()),
            profile_name: Some("ops".to_string()),
            ..keys()
        };

        let source = CredentialSource::resolve(Some(&details));
        assert_eq!(source.name(), "assume-role");
        assert_eq!(source.region(), Some("eu-west-1"));
    }

    #[test]
    fn test_static_keys_need_region() {
        let details = keys();
        assert_eq!(CredentialSource::resolve(Some(&details)).name(), "static");

        let no_region = AwsDetails {
            region_name: None,
            ..keys()
        };
        assert_eq!(
            CredentialSource::resolve(Some(&no_region)),
            CredentialSource::Ambient { region: None }
        );
    }

    #[test]
    fn test_profile_keeps_region() {
        let details = AwsDetails::from_json_str(
            r#"{"profile_name": "media", "region_name": "ap-south-1"}"#,
        )
        .unwrap();

        assert_eq!(
            CredentialSource::resolve(Some(&details)),
            CredentialSource::Profile {
                name: "media".to_string(),
                region: Some("ap-south-1".to_string())
            }
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", keys());
        assert!(rendered.contains("AKIA123"));
        assert!(!rendered.contains("shh"));
    }

    #[tokio::test]
    async fn test_factory_with_static_keys() {
        let factory = AwsClientFactory::new(Some(&keys())).await.unwrap();
        assert_eq!(factory.credential_source().name(), "static");
        assert_eq!(
            factory.sdk_config().region().map(|r| r.as_ref()),
            Some("eu-west-1")
        );
    }
}
