//! Retry worker for deferred access grants
//!
//! A verification that succeeded but whose grant call failed or timed out
//! leaves the handle in the retry queue. This worker drains it on an
//! interval. Only handles that actually hold a verified record are granted,
//! which also settles inserts whose outcome was unknown to the caller.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use hq_shared::VerificationConfig;

use crate::repositories::VerifiedStore;
use crate::services::verification::AccessGrantPort;

use super::retry_queue::GrantRetryQueue;

/// Configuration for the grant retry worker
#[derive(Debug, Clone)]
pub struct GrantRetryConfig {
    /// How often to drain the queue (in seconds)
    pub interval_seconds: u64,
    /// Failed grant attempts before an entry is abandoned
    pub max_attempts: u32,
    /// Maximum entries handled per pass
    pub batch_size: usize,
    /// Upper bound for one grant call
    pub grant_timeout: Duration,
    pub enabled: bool,
}

impl Default for GrantRetryConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            max_attempts: 10,
            batch_size: 100,
            grant_timeout: Duration::from_secs(5),
            enabled: true,
        }
    }
}

impl From<&VerificationConfig> for GrantRetryConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            interval_seconds: config.grant_retry_interval_secs,
            max_attempts: config.grant_retry_max_attempts,
            grant_timeout: Duration::from_millis(config.grant_timeout_ms),
            enabled: config.grant_retry_interval_secs > 0,
            ..Default::default()
        }
    }
}

/// Outcome of one pass over the queue
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetryPassResult {
    pub granted: usize,
    pub requeued: usize,
    pub abandoned: usize,
    /// Entries dropped because the handle has no verified record
    pub skipped: usize,
}

impl RetryPassResult {
    pub fn processed(&self) -> usize {
        self.granted + self.requeued + self.abandoned + self.skipped
    }
}

/// Drains the grant retry queue
pub struct GrantRetryService<V, G>
where
    V: VerifiedStore + ?Sized + 'static,
    G: AccessGrantPort + ?Sized + 'static,
{
    verified: Arc<V>,
    access: Arc<G>,
    queue: Arc<dyn GrantRetryQueue>,
    config: GrantRetryConfig,
}

impl<V, G> GrantRetryService<V, G>
where
    V: VerifiedStore + ?Sized + 'static,
    G: AccessGrantPort + ?Sized + 'static,
{
    pub fn new(
        verified: Arc<V>,
        access: Arc<G>,
        queue: Arc<dyn GrantRetryQueue>,
        config: GrantRetryConfig,
    ) -> Self {
        Self {
            verified,
            access,
            queue,
            config,
        }
    }

    /// Run a single pass over up to `batch_size` queued entries
    pub async fn run_pass(&self) -> RetryPassResult {
        let mut result = RetryPassResult::default();
        let batch = self.queue.take_batch(self.config.batch_size).await;
        if batch.is_empty() {
            return result;
        }

        for mut entry in batch {
            match self.verified.find_by_handle(&entry.handle).await {
                Ok(records) if records.is_empty() => {
                    info!(
                        handle = %entry.handle,
                        event = "grant_retry_skipped",
                        "No verified record for handle, dropping deferred grant"
                    );
                    result.skipped += 1;
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        handle = %entry.handle,
                        error = %e,
                        event = "grant_retry_store_unavailable",
                        "Could not confirm verified record, keeping grant queued"
                    );
                    self.queue.requeue(entry).await;
                    result.requeued += 1;
                    continue;
                }
            }

            let outcome = match timeout(self.config.grant_timeout, self.access.grant(&entry.handle)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(format!(
                    "grant timed out after {}ms",
                    self.config.grant_timeout.as_millis()
                )),
            };

            match outcome {
                Ok(()) => {
                    info!(
                        handle = %entry.handle,
                        attempts = entry.attempts + 1,
                        event = "grant_retry_succeeded",
                        "Deferred access grant completed"
                    );
                    result.granted += 1;
                }
                Err(message) => {
                    entry.attempts += 1;
                    entry.last_error = Some(message.clone());
                    if entry.attempts >= self.config.max_attempts {
                        error!(
                            handle = %entry.handle,
                            attempts = entry.attempts,
                            error = %message,
                            event = "grant_retry_abandoned",
                            "Giving up on access grant"
                        );
                        result.abandoned += 1;
                    } else {
                        warn!(
                            handle = %entry.handle,
                            attempts = entry.attempts,
                            error = %message,
                            event = "grant_retry_failed",
                            "Access grant failed again, requeued"
                        );
                        self.queue.requeue(entry).await;
                        result.requeued += 1;
                    }
                }
            }
        }

        info!(
            granted = result.granted,
            requeued = result.requeued,
            abandoned = result.abandoned,
            skipped = result.skipped,
            "Grant retry pass completed"
        );
        result
    }

    /// Start the retry worker as a background task
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Grant retry worker is disabled");
            return None;
        }

        let interval = Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "Grant retry worker started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;
                self.run_pass().await;
            }
        }))
    }
}
