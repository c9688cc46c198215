//! Media Ops Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities used across the media-ops workspace members:
//!
//! - **Error Handling**: [`MopsError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by environment variables
//! - **Digests**: content fingerprints attached to published job statuses
//! - **Config blobs**: compact JSON → zlib → base64 encoding for passing a
//!   whole configuration through one environment variable
//!
//! # Example
//!
//! ```no_run
//! use mops_common::{digest, Result};
//!
//! fn fingerprint(path: &str) -> Result<String> {
//!     digest::sha256_file(path)
//! }
//! ```

pub mod config_blob;
pub mod digest;
pub mod error;
pub mod logging;

pub use error::{MopsError, Result};
