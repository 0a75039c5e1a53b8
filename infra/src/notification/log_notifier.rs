//! Notifier that only logs

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use hq_core::services::verification::NotificationPort;
use hq_shared::validation::mask_email;

/// Development notifier that records deliveries in the log
///
/// The code itself is only emitted at debug level.
#[derive(Clone, Default)]
pub struct LogNotifier {
    sent: Arc<AtomicU64>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of codes "sent" so far
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationPort for LogNotifier {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), String> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        info!(
            email = %mask_email(email),
            event = "code_delivered",
            "Verification code delivered (log notifier)"
        );
        debug!(email = %mask_email(email), code = code, "Log notifier payload");
        Ok(())
    }
}
