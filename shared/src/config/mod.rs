//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis configuration for the challenge store
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `ports` - Outbound notification and access-grant adapters
//! - `server` - HTTP server and gateway authentication
//! - `storage` - Which backend holds challenges and verified records
//! - `verification` - Challenge lifetime, timeouts and maintenance intervals

pub mod cache;
pub mod database;
pub mod environment;
pub mod ports;
pub mod server;
pub mod storage;
pub mod verification;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use ports::{GrantConfig, NotificationConfig};
pub use server::ServerConfig;
pub use storage::{ChallengeBackend, StorageConfig, VerifiedBackend};
pub use verification::VerificationConfig;

/// Environment variable naming an optional TOML configuration file
pub const CONFIG_FILE_ENV: &str = "HARLEQUIN_CONFIG";

/// Prefix for environment variables overriding file values (`HARLEQUIN__SERVER__PORT`)
pub const CONFIG_ENV_PREFIX: &str = "HARLEQUIN";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Storage backend selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Verification protocol settings
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Notification adapter settings
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Access-grant adapter settings
    #[serde(default)]
    pub grant: GrantConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            storage: StorageConfig::default(),
            verification: VerificationConfig::default(),
            notification: NotificationConfig::default(),
            grant: GrantConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file is read first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|f| f.parse().ok()) {
            logging.format = format;
        }

        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            storage: StorageConfig::from_env(),
            verification: VerificationConfig::from_env(),
            notification: NotificationConfig::from_env(),
            grant: GrantConfig::from_env(),
            logging,
        }
    }

    /// Load configuration from an optional TOML file layered under the environment
    ///
    /// The file named by `HARLEQUIN_CONFIG` is read when set. Variables such as
    /// `HARLEQUIN__SERVER__PORT=9000` override values from the file. Without a
    /// file this falls back to [`AppConfig::from_env`].
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let Ok(path) = std::env::var(CONFIG_FILE_ENV) else {
            return Ok(Self::from_env());
        };

        config::Config::builder()
            .add_source(config::File::with_name(&path))
            .add_source(
                config::Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
