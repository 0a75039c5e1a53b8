//! Types for verification service results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Challenge, VerifiedRecord};

/// Result of issuing a challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginOutcome {
    pub handle: String,
    /// Normalized address the code was sent to
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Challenge> for BeginOutcome {
    fn from(challenge: &Challenge) -> Self {
        Self {
            handle: challenge.handle.clone(),
            email: challenge.email.clone(),
            issued_at: challenge.issued_at,
            expires_at: challenge.expires_at,
        }
    }
}

/// Whether the privilege was granted inline or left to the retry worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    Granted,
    Deferred,
}

/// Result of a successful response validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub record: VerifiedRecord,
    pub grant: GrantStatus,
}

/// Verification state of a handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum IdentityState {
    Unverified,
    Pending { expires_at: DateTime<Utc> },
    Verified { email: String },
}
