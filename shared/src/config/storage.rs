//! Storage backend selection

use serde::{Deserialize, Serialize};

/// Backend holding pending challenges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeBackend {
    /// Process-local map; state is lost on restart
    #[default]
    Memory,
    /// `challenges` table in MySQL
    Mysql,
    /// Redis keys with expiry
    Redis,
}

impl std::str::FromStr for ChallengeBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mysql" => Ok(Self::Mysql),
            "redis" => Ok(Self::Redis),
            _ => Err(format!("Invalid challenge backend: {}", s)),
        }
    }
}

/// Backend holding verified records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerifiedBackend {
    /// Process-local map; state is lost on restart
    #[default]
    Memory,
    /// `verified` table in MySQL
    Mysql,
}

impl std::str::FromStr for VerifiedBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mysql" => Ok(Self::Mysql),
            _ => Err(format!("Invalid verified backend: {}", s)),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where challenges live
    pub challenges: ChallengeBackend,
    /// Where verified records live
    pub verified: VerifiedBackend,
}

impl StorageConfig {
    /// Create from `CHALLENGE_BACKEND` and `VERIFIED_BACKEND`
    pub fn from_env() -> Self {
        Self {
            challenges: std::env::var("CHALLENGE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            verified: std::env::var("VERIFIED_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Whether any backend needs a MySQL pool
    pub fn needs_database(&self) -> bool {
        self.challenges == ChallengeBackend::Mysql || self.verified == VerifiedBackend::Mysql
    }

    /// Whether any backend needs a Redis connection
    pub fn needs_redis(&self) -> bool {
        self.challenges == ChallengeBackend::Redis
    }
}
