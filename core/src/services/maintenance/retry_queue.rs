//! Queue of access grants that could not be completed inline

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A handle whose privilege grant is still outstanding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGrant {
    pub handle: String,
    /// Failed grant attempts made by the retry worker
    pub attempts: u32,
    pub last_error: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}

impl PendingGrant {
    pub fn new(handle: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            attempts: 0,
            last_error: Some(reason.into()),
            scheduled_at: Utc::now(),
        }
    }
}

/// Holds deferred grants until the retry worker picks them up
#[async_trait]
pub trait GrantRetryQueue: Send + Sync {
    /// Queue a handle; a handle already queued is not duplicated
    async fn schedule(&self, handle: &str, reason: &str);

    /// Put an entry back after a failed attempt
    async fn requeue(&self, entry: PendingGrant);

    /// Remove and return up to `max` entries, oldest first
    async fn take_batch(&self, max: usize) -> Vec<PendingGrant>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Process-local retry queue
///
/// Entries are lost on restart; the grant port is idempotent so a restart
/// only costs the grants that were still queued.
#[derive(Clone, Default)]
pub struct InMemoryGrantRetryQueue {
    entries: Arc<Mutex<VecDeque<PendingGrant>>>,
}

impl InMemoryGrantRetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of queued entries without removing them
    pub async fn snapshot(&self) -> Vec<PendingGrant> {
        self.entries.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl GrantRetryQueue for InMemoryGrantRetryQueue {
    async fn schedule(&self, handle: &str, reason: &str) {
        let mut entries = self.entries.lock().await;
        match entries.iter_mut().find(|e| e.handle == handle) {
            Some(existing) => existing.last_error = Some(reason.to_string()),
            None => entries.push_back(PendingGrant::new(handle, reason)),
        }
    }

    async fn requeue(&self, entry: PendingGrant) {
        let mut entries = self.entries.lock().await;
        match entries.iter_mut().find(|e| e.handle == entry.handle) {
            Some(existing) => {
                existing.attempts = existing.attempts.max(entry.attempts);
                existing.last_error = entry.last_error;
            }
            None => entries.push_back(entry),
        }
    }

    async fn take_batch(&self, max: usize) -> Vec<PendingGrant> {
        let mut entries = self.entries.lock().await;
        let count = max.min(entries.len());
        entries.drain(..count).collect()
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
