//! Configuration for verification service

use chrono::Duration;
use hq_shared::VerificationConfig;

use crate::domain::entities::DEFAULT_CHALLENGE_TTL_HOURS;

/// Configuration for verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Lifetime of an issued challenge
    pub challenge_ttl: Duration,
    /// Upper bound for a notification send
    pub notify_timeout: std::time::Duration,
    /// Upper bound for an access grant call
    pub grant_timeout: std::time::Duration,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            challenge_ttl: Duration::hours(DEFAULT_CHALLENGE_TTL_HOURS),
            notify_timeout: std::time::Duration::from_secs(5),
            grant_timeout: std::time::Duration::from_secs(5),
        }
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            challenge_ttl: Duration::hours(config.challenge_ttl_hours),
            notify_timeout: std::time::Duration::from_millis(config.notify_timeout_ms),
            grant_timeout: std::time::Duration::from_millis(config.grant_timeout_ms),
        }
    }
}
