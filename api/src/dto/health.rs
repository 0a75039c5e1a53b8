use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use hq_infra::database::PoolStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health of one backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub response_time_ms: u64,

    /// Connection pool usage, for pooled backends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolUsage>,
}

impl ServiceHealth {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: None,
            response_time_ms,
            pool: None,
        }
    }

    pub fn unhealthy(message: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            response_time_ms,
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: PoolUsage) -> Self {
        self.pool = Some(pool);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUsage {
    pub size: u32,
    pub idle: u32,
    pub active: u32,
    pub max_connections: u32,
}

impl From<PoolStatistics> for PoolUsage {
    fn from(stats: PoolStatistics) -> Self {
        Self {
            size: stats.size,
            idle: stats.idle,
            active: stats.active,
            max_connections: stats.max_connections,
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Unhealthy if any backend is
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,

    /// Backends in use; in-memory stores are not listed
    pub services: BTreeMap<String, ServiceHealth>,
}

impl HealthResponse {
    pub fn new(services: BTreeMap<String, ServiceHealth>) -> Self {
        let status = if services.values().all(|s| s.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        Self {
            status,
            service: "harlequin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            services,
        }
    }
}
