use super::StatusTable;
use crate::error::{JobsError, Result};
use crate::status::types::StatusRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// In-process status table, for tests and dry runs
pub struct MemoryStatusTable {
    name: String,
    created: AtomicBool,
    /// Readiness checks left before a created table turns active
    pending_checks: AtomicUsize,
    rows: Mutex<BTreeMap<String, StatusRecord>>,
}

impl MemoryStatusTable {
    /// A table that does not exist until `create` is called
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: AtomicBool::new(false),
            pending_checks: AtomicUsize::new(0),
            rows: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn existing(name: impl Into<String>) -> Self {
        let table = Self::new(name);
        table.created.store(true, Ordering::SeqCst);
        table
    }

    /// Report not ready for the first `checks` readiness checks, the way a
    /// freshly created DynamoDB table stays `CREATING` for a while
    pub fn activating_after(self, checks: usize) -> Self {
        self.pending_checks.store(checks, Ordering::SeqCst);
        self
    }

    fn is_active(&self) -> bool {
        self.created.load(Ordering::SeqCst) && self.pending_checks.load(Ordering::SeqCst) == 0
    }

    pub fn len(&self) -> usize {
        self.rows().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<String, StatusRecord>>> {
        self.rows
            .lock()
            .map_err(|_| JobsError::table(format!("table '{}' lock poisoned", self.name)))
    }

    fn require_created(&self) -> Result<()> {
        if !self.created.load(Ordering::SeqCst) {
            Err(JobsError::table(format!("table '{}' does not exist", self.name)))
        } else if !self.is_active() {
            Err(JobsError::table(format!("table '{}' is not active", self.name)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StatusTable for MemoryStatusTable {
    fn table_name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.created.load(Ordering::SeqCst))
    }

    async fn create(&self) -> Result<()> {
        self.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_ready(&self) -> Result<bool> {
        if !self.created.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let pending = self
            .pending_checks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        Ok(pending.is_err())
    }

    async fn get(&self, job_id: &str) -> Result<Option<StatusRecord>> {
        self.require_created()?;
        Ok(self.rows()?.get(job_id).cloned())
    }

    async fn put(&self, record: &StatusRecord) -> Result<bool> {
        self.require_created()?;
        Ok(self
            .rows()?
            .insert(record.id.clone(), record.clone())
            .is_some())
    }

    async fn refresh(&self, job_id: &str, time_stamp: &str, digest: Option<&str>) -> Result<()> {
        self.require_created()?;
        let mut rows = self.rows()?;
        let row = rows.entry(job_id.to_string()).or_insert_with(|| StatusRecord {
            id: job_id.to_string(),
            asset_id: String::new(),
            complete: false,
            digest: None,
            state: String::new(),
            time_stamp: String::new(),
        });

        row.time_stamp = time_stamp.to_string();
        if let Some(digest) = digest {
            row.digest = Some(digest.to_string());
        }
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<StatusRecord>> {
        self.require_created()?;
        Ok(self.rows()?.values().cloned().collect())
    }
}
