//! Status history cache for the Chicane backend
//!
//! Holds `asset_id -> {timestamp, digest}` built from the status service's
//! history. The cache is considered fresh for `ttl` after the last refresh,
//! and only while it holds at least one entry. A refresh merges the new
//! entries over the old ones: keys present in the response are added or
//! overwritten, keys missing from the response are kept.
//!
//! The staleness check, the remote fetch and the merge all happen under one
//! async mutex, so concurrent callers sharing a cache trigger at most one
//! fetch per expiry.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// How long a refreshed history stays fresh
pub const DEFAULT_HISTORY_TTL: Duration = Duration::from_secs(360);

/// Last known history of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub digest: Option<String>,
}

pub type History = BTreeMap<String, HistoryEntry>;

#[derive(Default)]
struct CacheState {
    entries: History,
    last_updated: Option<Instant>,
}

impl CacheState {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.entries.is_empty()
            && self
                .last_updated
                .map(|at| at.elapsed() < ttl)
                .unwrap_or(false)
    }
}

pub struct HistoryCache {
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_HISTORY_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// The process-wide cache, for callers that want every backend instance
    /// in the process to share one history.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<HistoryCache>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(HistoryCache::new())).clone()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn is_fresh(&self) -> bool {
        self.state.lock().await.is_fresh(self.ttl)
    }

    pub async fn snapshot(&self) -> History {
        self.state.lock().await.entries.clone()
    }

    /// Force the next lookup to refetch; entries are kept for the merge.
    pub async fn invalidate(&self) {
        self.state.lock().await.last_updated = None;
    }

    /// Return the cached history, refreshing it first when stale.
    ///
    /// `fetch` yields `None` when the remote has nothing at all, which leaves
    /// the cache and its refresh time untouched, or `Some(entries)` to merge.
    /// A failed fetch leaves the cache as it was.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<History>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Vec<(String, HistoryEntry)>>>>,
    {
        let mut state = self.state.lock().await;

        if state.is_fresh(self.ttl) {
            debug!(entries = state.entries.len(), "Recently retrieved history available");
            return Ok(state.entries.clone());
        }

        match fetch().await? {
            Some(entries) => {
                let fetched = entries.len();
                state.entries.extend(entries);
                state.last_updated = Some(Instant::now());
                info!(fetched, total = state.entries.len(), "Status history refreshed");
            },
            None => info!("No previous status history found"),
        }

        Ok(state.entries.clone())
    }
}
