use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use hq_core::domain::Key;
use hq_core::services::{BeginOutcome, GrantStatus, IdentityState, VerifyOutcome};

/// Body of `POST /verification/begin`
///
/// The handle is never taken from the body; it comes from the
/// authenticated sender headers.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BeginVerificationRequest {
    /// Address that will receive the code; format is checked by the service
    #[validate(length(min = 1, max = 254))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeginVerificationResponse {
    pub status: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl From<BeginOutcome> for BeginVerificationResponse {
    fn from(outcome: BeginOutcome) -> Self {
        Self {
            status: "pending".to_string(),
            email: outcome.email,
            expires_at: outcome.expires_at,
        }
    }
}

/// Body of `POST /verification/respond`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RespondRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondResponse {
    pub status: String,
    pub email: String,
    pub verified_at: DateTime<Utc>,
    pub grant: GrantStatus,
}

impl From<VerifyOutcome> for RespondResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        Self {
            status: "verified".to_string(),
            email: outcome.record.email,
            verified_at: outcome.record.verified_at,
            grant: outcome.grant,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub handle: String,
    #[serde(flatten)]
    pub state: IdentityState,
}

/// Body of `POST /admin/revoke`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeRequest {
    pub key: Key,
}

impl RevokeRequest {
    /// Whether the key is well formed once normalized
    pub fn is_valid(&self) -> bool {
        self.key.clone().normalized().is_valid()
    }
}
