//! Access-grant adapters
//!
//! Implementations of [`AccessGrantPort`]. Both are idempotent: granting a
//! privilege the handle already holds is harmless.

use std::sync::Arc;
use tracing::{info, warn};

use hq_core::services::verification::AccessGrantPort;

use crate::config::GrantConfig;
use crate::InfrastructureError;

pub mod log_grant;
pub mod webhook_grant;


pub use log_grant::LogAccessGrant;
pub use webhook_grant::WebhookAccessGrant;

/// Create an access-grant adapter based on configuration
///
/// Unknown providers fall back to the log adapter.
pub fn create_access_grant(
    config: &GrantConfig,
) -> Result<Arc<dyn AccessGrantPort>, InfrastructureError> {
    match config.provider.as_str() {
        "log" => Ok(Arc::new(LogAccessGrant::new(config.privilege.clone()))),
        "webhook" => {
            info!("Using webhook access grant");
            Ok(Arc::new(WebhookAccessGrant::from_config(config)?))
        }
        other => {
            warn!(provider = other, "Unknown grant provider, falling back to log");
            Ok(Arc::new(LogAccessGrant::new(config.privilege.clone())))
        }
    }
}
