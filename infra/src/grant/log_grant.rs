//! Access grant that only logs

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::info;

use hq_core::services::verification::AccessGrantPort;

/// Development grant adapter that records granted handles
#[derive(Clone)]
pub struct LogAccessGrant {
    privilege: String,
    granted: Arc<Mutex<HashSet<String>>>,
}

impl LogAccessGrant {
    pub fn new(privilege: impl Into<String>) -> Self {
        Self {
            privilege: privilege.into(),
            granted: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn is_granted(&self, handle: &str) -> bool {
        self.granted
            .lock()
            .map(|granted| granted.contains(handle))
            .unwrap_or(false)
    }
}

#[async_trait]
impl AccessGrantPort for LogAccessGrant {
    async fn grant(&self, handle: &str) -> Result<(), String> {
        let newly_granted = self
            .granted
            .lock()
            .map_err(|_| "grant registry poisoned".to_string())?
            .insert(handle.to_string());

        info!(
            handle = handle,
            privilege = %self.privilege,
            repeated = !newly_granted,
            event = "access_granted",
            "Privilege granted (log adapter)"
        );
        Ok(())
    }
}
