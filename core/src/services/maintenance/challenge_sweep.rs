//! Periodic removal of expired challenges

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use hq_shared::VerificationConfig;

use crate::errors::StoreError;
use crate::repositories::ChallengeStore;
use crate::services::clock::Clock;

/// Configuration for the expired-challenge sweep
#[derive(Debug, Clone)]
pub struct ChallengeSweepConfig {
    /// How often to sweep (in seconds)
    pub interval_seconds: u64,
    /// How long an expired challenge is kept before removal
    pub retention: ChronoDuration,
    pub enabled: bool,
}

impl Default for ChallengeSweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            retention: ChronoDuration::hours(24),
            enabled: true,
        }
    }
}

impl From<&VerificationConfig> for ChallengeSweepConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            interval_seconds: config.challenge_sweep_interval_secs,
            retention: ChronoDuration::hours(config.expired_challenge_retention_hours),
            enabled: config.challenge_sweep_interval_secs > 0,
        }
    }
}

/// Deletes challenges that expired more than `retention` ago
pub struct ChallengeSweepService<C: ChallengeStore + ?Sized + 'static> {
    store: Arc<C>,
    clock: Arc<dyn Clock>,
    config: ChallengeSweepConfig,
}

impl<C: ChallengeStore + ?Sized + 'static> ChallengeSweepService<C> {
    pub fn new(store: Arc<C>, clock: Arc<dyn Clock>, config: ChallengeSweepConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Run a single sweep, returning the number of challenges removed
    pub async fn run_sweep(&self) -> Result<u64, StoreError> {
        let cutoff = self.clock.now() - self.config.retention;
        let purged = self.store.purge_expired(cutoff).await?;
        if purged > 0 {
            info!(
                purged = purged,
                cutoff = %cutoff,
                event = "challenges_purged",
                "Removed expired challenges"
            );
        }
        Ok(purged)
    }

    /// Start the sweep as a background task
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Expired challenge sweep is disabled");
            return None;
        }

        let interval = Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "Challenge sweep started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_sweep().await {
                    error!(error = %e, "Challenge sweep failed");
                }
            }
        }))
    }
}
