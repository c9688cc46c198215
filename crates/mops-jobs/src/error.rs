//! Error types for job status tracking and dispatch
//!
//! Every remote call returns a typed error instead of logging and returning
//! nothing, so callers can tell "no data yet" (`Ok(None)` / empty map) from
//! "the request failed", and a retryable failure from a permanent one.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobsError>;

#[derive(Error, Debug)]
pub enum JobsError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced a response (connect, timeout, TLS, ...)
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered with an unexpected status
    #[error("Remote service returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// The remote payload did not have the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The status agent could not be found or created
    #[error("Agent '{agent}' could not be registered (status {status})")]
    AgentRegistration { agent: String, status: u16 },

    /// Status table storage failed
    #[error("Status table error: {0}")]
    Table(String),

    /// The status table did not become active in time
    #[error("Status table '{table}' not active after {waited:?}")]
    TableNotReady { table: String, waited: Duration },

    #[error(transparent)]
    Aws(#[from] mops_aws::AwsError),
}

impl JobsError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }

    pub fn remote(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        Self::Remote {
            status: status.as_u16(),
            body: body.into(),
        }
    }

    /// Whether retrying the same call later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            JobsError::Transport(_) | JobsError::TableNotReady { .. } => true,
            JobsError::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
