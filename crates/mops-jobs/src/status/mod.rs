//! Job status tracking
//!
//! A [`StatusManager`] records the state of a job for one asset and reads
//! back the latest state per asset. Two backends exist: the Chicane status
//! service over HTTP and a DynamoDB table. Pick one with a
//! [`StatusManagerConfig`] and [`get_status_manager`].

pub mod backend;
pub mod cache;
pub mod config;
pub mod manager;
pub mod table;
pub mod types;

pub use backend::{AgentRegistration, ChicaneStatus, DynamoDbStatus};
pub use cache::{HistoryCache, HistoryEntry, DEFAULT_HISTORY_TTL};
pub use config::{BackendKind, ChicaneConfig, DynamoDbConfig, StatusBody, StatusManagerConfig};
pub use manager::{get_status_manager, get_status_manager_by_kind, StatusManager};
pub use table::{DynamoStatusTable, MemoryStatusTable, StatusTable, TABLE_READY_TIMEOUT};
pub use types::{
    job_id, PublishOptions, PublishOutcome, StatusMap, StatusRecord, StatusSnapshot, WriteMode,
};
