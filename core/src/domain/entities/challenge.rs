//! Pending email challenge entity

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};

use super::identity::IdentityKey;

/// Number of decimal digits in a challenge code
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of a challenge (24 hours)
pub const DEFAULT_CHALLENGE_TTL_HOURS: i64 = 24;

/// A one-time code sent to an email address on behalf of a handle
///
/// At most one challenge exists per handle. Issuing a new one replaces the
/// previous value wholesale; a challenge is never edited in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Platform handle that requested verification
    pub handle: String,

    /// Normalized email address the code was sent to
    pub email: String,

    /// Zero-padded six digit code
    pub code: String,

    /// When the challenge was created
    pub issued_at: DateTime<Utc>,

    /// Last instant at which the code is accepted
    pub expires_at: DateTime<Utc>,
}

impl Challenge {
    /// Issue a challenge for an identity with the given lifetime
    pub fn issue(identity: &IdentityKey, code: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            handle: identity.handle().to_string(),
            email: identity.email().to_string(),
            code,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the challenge has passed its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Compare a submitted code against this challenge in constant time
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), submitted.as_bytes())
    }

    /// Remaining lifetime, zero once expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.is_expired_at(now) {
            Duration::zero()
        } else {
            self.expires_at - now
        }
    }
}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Challenge")
            .field("handle", &self.handle)
            .field("email", &self.email)
            .field("code", &"******")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
