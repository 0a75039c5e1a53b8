//! Outbound ports used by the verification service

use async_trait::async_trait;

/// Sends a challenge code to the user off-channel
#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Deliver `code` to `email`, attempting once
    async fn send_code(&self, email: &str, code: &str) -> Result<(), String>;
}

/// Grants the verified privilege in the surrounding platform
///
/// Implementations must be idempotent: granting twice is harmless.
#[async_trait]
pub trait AccessGrantPort: Send + Sync {
    async fn grant(&self, handle: &str) -> Result<(), String>;
}
