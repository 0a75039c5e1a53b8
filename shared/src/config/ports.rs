//! Outbound adapter configuration
//!
//! The verification core only knows the notification and access-grant ports.
//! These settings choose which adapter backs each port at startup.

use serde::{Deserialize, Serialize};

/// Notification adapter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Adapter name ("log", "webhook")
    pub provider: String,
    /// Endpoint receiving `{ "destination", "code" }` for the webhook adapter
    pub webhook_url: Option<String>,
    /// Bearer token sent with webhook requests
    pub webhook_token: Option<String>,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            provider: String::from("log"),
            webhook_url: None,
            webhook_token: None,
            request_timeout_secs: 10,
        }
    }
}

impl NotificationConfig {
    /// Create from `NOTIFIER_*` environment variables
    pub fn from_env() -> Self {
        Self {
            provider: std::env::var("NOTIFIER_PROVIDER").unwrap_or_else(|_| "log".to_string()),
            webhook_url: std::env::var("NOTIFIER_WEBHOOK_URL").ok(),
            webhook_token: std::env::var("NOTIFIER_WEBHOOK_TOKEN").ok(),
            ..Default::default()
        }
    }
}

/// Access-grant adapter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GrantConfig {
    /// Adapter name ("log", "webhook")
    pub provider: String,
    /// Endpoint receiving `{ "handle", "privilege" }` for the webhook adapter
    pub webhook_url: Option<String>,
    /// Bearer token sent with webhook requests
    pub webhook_token: Option<String>,
    /// Name of the privilege granted on success
    pub privilege: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for GrantConfig {
    fn default() -> Self {
        Self {
            provider: String::from("log"),
            webhook_url: None,
            webhook_token: None,
            privilege: String::from("verified"),
            request_timeout_secs: 10,
        }
    }
}

impl GrantConfig {
    /// Create from `GRANT_*` environment variables
    pub fn from_env() -> Self {
        Self {
            provider: std::env::var("GRANT_PROVIDER").unwrap_or_else(|_| "log".to_string()),
            webhook_url: std::env::var("GRANT_WEBHOOK_URL").ok(),
            webhook_token: std::env::var("GRANT_WEBHOOK_TOKEN").ok(),
            privilege: std::env::var("GRANT_PRIVILEGE").unwrap_or_else(|_| "verified".to_string()),
            ..Default::default()
        }
    }
}
