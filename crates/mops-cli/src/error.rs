//! Error types for the mops CLI
//!
//! Messages are user-facing and say what to check next.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Pass --config <file|s3://bucket/key> or set MOPS_CONFIG_BLOB.")]
    Config(String),

    /// Configuration has no section for the requested service
    #[error("The configuration has no '{0}' section.")]
    MissingSection(&'static str),

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions.")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}. Check the document syntax.")]
    JsonParse(#[from] serde_json::Error),

    /// Status service, status table or Mapsor call failed
    #[error("{0}")]
    Jobs(#[from] mops_jobs::JobsError),

    /// AWS call failed
    #[error("AWS error: {0}. Check the AWS_DETAILS credentials and region.")]
    Aws(#[from] mops_aws::AwsError),

    /// Digest or config blob handling failed
    #[error(transparent)]
    Common(#[from] mops_common::MopsError),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether running the same command again later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, CliError::Jobs(err) if err.is_transient())
    }
}
