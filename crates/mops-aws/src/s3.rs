//! S3 object access
//!
//! Used mainly to pull configuration documents kept in S3.

use crate::error::{AwsError, Result};
use aws_sdk_s3::{primitives::ByteStream, Client};
use tracing::{debug, info, instrument};

/// A parsed `s3://bucket/key` location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

impl S3Location {
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("s3://")
            .ok_or_else(|| AwsError::InvalidLocation(uri.to_string()))?;

        match rest.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Self {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            _ => Err(AwsError::InvalidLocation(uri.to_string())),
        }
    }

    pub fn is_s3_uri(uri: &str) -> bool {
        uri.starts_with("s3://")
    }
}

impl std::fmt::Display for S3Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[derive(Clone)]
pub struct S3Objects {
    client: Client,
}

impl S3Objects {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[instrument(skip(self, location), fields(location = %location))]
    pub async fn get_bytes(&self, location: &S3Location) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| AwsError::service("get_object", location.to_string(), e))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| AwsError::service("get_object", location.to_string(), e))?
            .into_bytes()
            .to_vec();

        debug!(bytes = data.len(), "Downloaded S3 object");
        Ok(data)
    }

    pub async fn get_string(&self, location: &S3Location) -> Result<String> {
        let data = self.get_bytes(location).await?;
        String::from_utf8(data).map_err(|_| AwsError::NotUtf8(location.to_string()))
    }

    #[instrument(skip(self, location, data), fields(location = %location))]
    pub async fn put_bytes(
        &self,
        location: &S3Location,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<()> {
        let size = data.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .body(ByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AwsError::service("put_object", location.to_string(), e))?;

        info!(bytes = size, "Uploaded S3 object");
        Ok(())
    }

    #[instrument(skip(self, location), fields(location = %location))]
    pub async fn exists(&self, location: &S3Location) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false);
                if missing {
                    Ok(false)
                } else {
                    Err(AwsError::service("head_object", location.to_string(), err))
                }
            },
        }
    }
}
