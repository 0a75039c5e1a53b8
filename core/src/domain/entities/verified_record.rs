//! Verified email ownership record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable proof that a handle controls an email address
///
/// Keyed by email: at most one record exists per address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedRecord {
    pub email: String,
    pub handle: String,
    pub verified_at: DateTime<Utc>,
}

impl VerifiedRecord {
    pub fn new(email: impl Into<String>, handle: impl Into<String>, verified_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            handle: handle.into(),
            verified_at,
        }
    }
}
