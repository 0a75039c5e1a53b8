//! Access grant through an HTTP endpoint on the chat platform side

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use hq_core::services::verification::AccessGrantPort;

use crate::config::GrantConfig;
use crate::InfrastructureError;

#[derive(Serialize)]
struct GrantRequest<'a> {
    handle: &'a str,
    privilege: &'a str,
}

/// POSTs `{ "handle", "privilege" }` to the platform bridge
pub struct WebhookAccessGrant {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    privilege: String,
}

impl WebhookAccessGrant {
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        privilege: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token,
            privilege: privilege.into(),
        })
    }

    pub fn from_config(config: &GrantConfig) -> Result<Self, InfrastructureError> {
        let url = config.webhook_url.clone().ok_or_else(|| {
            InfrastructureError::Config("GRANT_WEBHOOK_URL is required for the webhook grant".to_string())
        })?;
        Self::new(
            url,
            config.webhook_token.clone(),
            config.privilege.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn request_grant(&self, handle: &str) -> Result<(), InfrastructureError> {
        let mut request = self.client.post(&self.url).json(&GrantRequest {
            handle,
            privilege: &self.privilege,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InfrastructureError::Delivery(format!(
                "platform bridge responded with {}",
                status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AccessGrantPort for WebhookAccessGrant {
    async fn grant(&self, handle: &str) -> Result<(), String> {
        match self.request_grant(handle).await {
            Ok(()) => {
                info!(handle = handle, privilege = %self.privilege, event = "access_granted", "Privilege granted");
                Ok(())
            }
            Err(e) => {
                error!(handle = handle, error = %e, "Grant webhook failed");
                Err(e.to_string())
            }
        }
    }
}
