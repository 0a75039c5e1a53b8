//! Verification protocol configuration

use serde::{Deserialize, Serialize};

/// Challenge lifetime, outbound call timeouts and maintenance cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Hours a challenge stays valid after issuance
    pub challenge_ttl_hours: i64,

    /// Upper bound for a single notification send, in milliseconds
    pub notify_timeout_ms: u64,

    /// Upper bound for a single access grant call, in milliseconds
    pub grant_timeout_ms: u64,

    /// Seconds between grant retry passes
    pub grant_retry_interval_secs: u64,

    /// Attempts before a deferred grant is abandoned
    pub grant_retry_max_attempts: u32,

    /// Seconds between expired-challenge sweeps (0 disables the sweep)
    pub challenge_sweep_interval_secs: u64,

    /// Hours an expired challenge is kept so a late response reads as expired
    pub expired_challenge_retention_hours: i64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            challenge_ttl_hours: 24,
            notify_timeout_ms: 5000,
            grant_timeout_ms: 5000,
            grant_retry_interval_secs: 60,
            grant_retry_max_attempts: 10,
            challenge_sweep_interval_secs: 3600,
            expired_challenge_retention_hours: 24,
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables, falling back to defaults per field
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            challenge_ttl_hours: env_or("CHALLENGE_TTL_HOURS", defaults.challenge_ttl_hours),
            notify_timeout_ms: env_or("NOTIFY_TIMEOUT_MS", defaults.notify_timeout_ms),
            grant_timeout_ms: env_or("GRANT_TIMEOUT_MS", defaults.grant_timeout_ms),
            grant_retry_interval_secs: env_or(
                "GRANT_RETRY_INTERVAL_SECS",
                defaults.grant_retry_interval_secs,
            ),
            grant_retry_max_attempts: env_or(
                "GRANT_RETRY_MAX_ATTEMPTS",
                defaults.grant_retry_max_attempts,
            ),
            challenge_sweep_interval_secs: env_or(
                "CHALLENGE_SWEEP_INTERVAL_SECS",
                defaults.challenge_sweep_interval_secs,
            ),
            expired_challenge_retention_hours: env_or(
                "EXPIRED_CHALLENGE_RETENTION_HOURS",
                defaults.expired_challenge_retention_hours,
            ),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
