//! Identity keys linking a platform handle to an email address

use std::fmt;

use hq_shared::validation::{is_valid_email, is_valid_handle, normalize_email};
use serde::{Deserialize, Serialize};

use crate::errors::VerificationError;

/// A validated (handle, email) pair
///
/// The email is stored normalized (trimmed, lowercased). The handle is kept
/// as the platform reported it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    handle: String,
    email: String,
}

impl IdentityKey {
    /// Validate and normalize a handle/email pair
    pub fn new(handle: impl Into<String>, email: &str) -> Result<Self, VerificationError> {
        let handle = handle.into();
        if !is_valid_handle(&handle) {
            return Err(VerificationError::InvalidHandle);
        }

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(VerificationError::InvalidEmail);
        }

        Ok(Self { handle, email })
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Either half of an identity, used for lookups and revocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Key {
    Handle(String),
    Email(String),
}

impl Key {
    pub fn handle(handle: impl Into<String>) -> Self {
        Self::Handle(handle.into())
    }

    /// Build an email key, normalizing the address
    pub fn email(email: &str) -> Self {
        Self::Email(normalize_email(email))
    }

    /// Normalize a key that arrived from outside (e.g. deserialized)
    pub fn normalized(self) -> Self {
        match self {
            Self::Handle(handle) => Self::Handle(handle),
            Self::Email(email) => Self::Email(normalize_email(&email)),
        }
    }

    /// Whether the key holds an acceptable value for its kind
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Handle(handle) => is_valid_handle(handle),
            Self::Email(email) => is_valid_email(email),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Handle(_) => "handle",
            Self::Email(_) => "email",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Handle(v) | Self::Email(v) => v,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.value())
    }
}
