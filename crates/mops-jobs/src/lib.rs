//! Media Ops job tracking and dispatch
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! - [`status`]: publish and read back per-asset job status through the
//!   Chicane status service or a DynamoDB table
//! - [`mapsor`]: submit and manage container jobs on Mapsor
//! - [`blip`]: feeds, media, segments and playlists on the Blip playout API
//! - [`hybrik`]: submit transcoding jobs to Hybrik
//! - [`http`]: the pooled HTTP client all of them use
//!
//! # Example
//!
//! ```no_run
//! use mops_jobs::status::{get_status_manager, PublishOptions, StatusManagerConfig};
//!
//! # async fn run() -> mops_jobs::Result<()> {
//! let config = StatusManagerConfig::from_value(serde_json::json!({
//!     "type": "chicane",
//!     "url": "https://chicane.example/api/status",
//!     "get_agents_url": "https://chicane.example/api/agents",
//!     "body": {"id": "transcoder-eu", "type": "transcode"}
//! }))?;
//!
//! let manager = get_status_manager(&config).await?;
//! manager
//!     .publish_status("done", "42", PublishOptions::new().complete(true))
//!     .await?;
//! let last = manager.get_last_status("42").await?;
//! # let _ = last;
//! # Ok(())
//! # }
//! ```

pub mod blip;
pub mod error;
pub mod http;
pub mod hybrik;
pub mod mapsor;
pub mod status;

pub use error::{JobsError, Result};
pub use blip::{BlipClient, BlipDetails, MediaScope, PlaylistSource};
pub use http::{BaseUrl, HttpRequests, HttpSettings, RequestBody, RequestOptions};
pub use hybrik::{HybrikClient, HybrikDetails, HybrikJob};
pub use mapsor::{ContainerJob, MapsorClient, MapsorDetails};
