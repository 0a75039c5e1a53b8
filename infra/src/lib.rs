//! # Infrastructure Layer
//!
//! Concrete implementations of the ports and stores defined in `hq_core`:
//!
//! - **Database**: MySQL challenge and verified-record stores using SQLx
//! - **Cache**: Redis client and a Redis-backed challenge store
//! - **Notification**: code delivery adapters (log, HTTP webhook)
//! - **Grant**: access-grant adapters (log, HTTP webhook)

use hq_core::errors::StoreError;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis client and challenge store
pub mod cache;

/// Notification adapters
pub mod notification;

/// Access-grant adapters
pub mod grant;

#[cfg(test)]
pub(crate) mod test_support;

/// Configuration re-exported from the shared crate
pub mod config {
    pub use hq_shared::config::{CacheConfig, DatabaseConfig, GrantConfig, NotificationConfig};
}

pub use cache::{RedisChallengeStore, RedisClient};
pub use database::{DatabasePool, MySqlChallengeStore, MySqlVerifiedStore};
pub use grant::{create_access_grant, LogAccessGrant, WebhookAccessGrant};
pub use notification::{create_notifier, LogNotifier, WebhookNotifier};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stored payload could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote endpoint rejected a delivery or grant
    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(err: InfrastructureError) -> Self {
        StoreError::unavailable(err.to_string())
    }
}
