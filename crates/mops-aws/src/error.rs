//! Error types for AWS access

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AwsError>;

#[derive(Error, Debug)]
pub enum AwsError {
    /// A service call returned an error (or never reached the service)
    #[error("AWS {operation} failed for '{target}': {message}")]
    Service {
        operation: &'static str,
        target: String,
        message: String,
    },

    /// A request shape could not be built (missing required field)
    #[error("Invalid DynamoDB request: {0}")]
    Build(#[from] aws_sdk_dynamodb::error::BuildError),

    #[error("Object '{0}' is not valid UTF-8")]
    NotUtf8(String),

    #[error("Invalid S3 location '{0}'. Expected format: s3://bucket/key")]
    InvalidLocation(String),

    #[error("Invalid AWS details: {0}")]
    InvalidDetails(#[from] serde_json::Error),
}

impl AwsError {
    /// Wrap an SDK error, keeping the full error chain in the message.
    pub fn service<E>(operation: &'static str, target: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        Self::Service {
            operation,
            target: target.into(),
            message: aws_sdk_dynamodb::error::DisplayErrorContext(err).to_string(),
        }
    }
}
