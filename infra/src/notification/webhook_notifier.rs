//! Notifier that hands codes to an HTTP endpoint

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use hq_core::services::verification::NotificationPort;
use hq_shared::validation::mask_email;

use crate::config::NotificationConfig;
use crate::InfrastructureError;

#[derive(Serialize)]
struct DeliveryRequest<'a> {
    destination: &'a str,
    code: &'a str,
}

/// POSTs `{ "destination", "code" }` to a mailer service
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl WebhookNotifier {
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }

    pub fn from_config(config: &NotificationConfig) -> Result<Self, InfrastructureError> {
        let url = config.webhook_url.clone().ok_or_else(|| {
            InfrastructureError::Config("NOTIFIER_WEBHOOK_URL is required for the webhook notifier".to_string())
        })?;
        Self::new(
            url,
            config.webhook_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn deliver(&self, email: &str, code: &str) -> Result<(), InfrastructureError> {
        let mut request = self.client.post(&self.url).json(&DeliveryRequest {
            destination: email,
            code,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InfrastructureError::Delivery(format!(
                "mailer responded with {}",
                status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationPort for WebhookNotifier {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), String> {
        match self.deliver(email, code).await {
            Ok(()) => {
                info!(email = %mask_email(email), event = "code_delivered", "Verification code handed to mailer");
                Ok(())
            }
            Err(e) => {
                error!(email = %mask_email(email), error = %e, "Mailer webhook failed");
                Err(e.to_string())
            }
        }
    }
}
