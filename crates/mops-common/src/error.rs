//! Error types shared by the media-ops utilities

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, MopsError>;

/// Error type for the shared utilities
#[derive(Error, Debug)]
pub enum MopsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config blob: {0}")]
    ConfigBlob(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MopsError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn config_blob(msg: impl Into<String>) -> Self {
        Self::ConfigBlob(msg.into())
    }
}
