//! Shared utilities and common types for the Harlequin server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Utility functions (email validation, log masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment,
    DatabaseConfig, CacheConfig, ServerConfig, LoggingConfig, LogFormat,
    VerificationConfig, NotificationConfig, GrantConfig, StorageConfig,
    ChallengeBackend, VerifiedBackend,
};
pub use errors::ErrorResponse;
pub use utils::validation;
