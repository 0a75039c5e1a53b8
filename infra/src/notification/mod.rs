//! Notification adapters
//!
//! Implementations of [`NotificationPort`] that deliver challenge codes:
//!
//! - **Log**: writes the delivery to the log, for development
//! - **Webhook**: POSTs the code to an external mailer

use std::sync::Arc;
use tracing::{info, warn};

use hq_core::services::verification::NotificationPort;

use crate::config::NotificationConfig;
use crate::InfrastructureError;

pub mod log_notifier;
pub mod webhook_notifier;


pub use log_notifier::LogNotifier;
pub use webhook_notifier::WebhookNotifier;

/// Create a notifier based on configuration
///
/// Unknown providers fall back to the log adapter.
pub fn create_notifier(
    config: &NotificationConfig,
) -> Result<Arc<dyn NotificationPort>, InfrastructureError> {
    match config.provider.as_str() {
        "log" => Ok(Arc::new(LogNotifier::new())),
        "webhook" => {
            info!("Using webhook notifier");
            Ok(Arc::new(WebhookNotifier::from_config(config)?))
        }
        other => {
            warn!(provider = other, "Unknown notification provider, falling back to log");
            Ok(Arc::new(LogNotifier::new()))
        }
    }
}
