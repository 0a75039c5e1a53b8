//! Error taxonomy for the verification protocol and its stores

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a caller should do after an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guidance {
    /// Send the same request again
    Retry,
    /// Start over with a fresh challenge
    RequestNewCode,
    /// Nothing left to do
    AlreadyDone,
    /// Operator attention is needed
    ContactSupport,
    /// Correct the input and try again
    FixInput,
}

impl Guidance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retry => "retry",
            Self::RequestNewCode => "request_new_code",
            Self::AlreadyDone => "already_done",
            Self::ContactSupport => "contact_support",
            Self::FixInput => "fix_input",
        }
    }
}

/// Errors surfaced by the verification service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Email address is already verified")]
    AlreadyVerified,

    #[error("No pending verification for this handle")]
    NoPendingChallenge,

    #[error("Verification code has expired")]
    ChallengeExpired,

    #[error("Verification code does not match")]
    CodeMismatch,

    #[error("Email address is bound to another verified handle")]
    DuplicateEmail,

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Notification delivery failed: {message}")]
    DeliveryFailed { message: String },

    #[error("Access grant failed: {message}")]
    GrantFailed { message: String },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid handle")]
    InvalidHandle,
}

impl VerificationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyVerified => "already_verified",
            Self::NoPendingChallenge => "no_pending_challenge",
            Self::ChallengeExpired => "challenge_expired",
            Self::CodeMismatch => "code_mismatch",
            Self::DuplicateEmail => "duplicate_email",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::DeliveryFailed { .. } => "delivery_failed",
            Self::GrantFailed { .. } => "grant_failed",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidHandle => "invalid_handle",
        }
    }

    /// Whether repeating the same request can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::DeliveryFailed { .. } | Self::GrantFailed { .. }
        )
    }

    pub fn guidance(&self) -> Guidance {
        match self {
            Self::AlreadyVerified | Self::DuplicateEmail => Guidance::AlreadyDone,
            Self::NoPendingChallenge | Self::ChallengeExpired => Guidance::RequestNewCode,
            Self::CodeMismatch | Self::StoreUnavailable { .. } | Self::DeliveryFailed { .. } => {
                Guidance::Retry
            }
            Self::GrantFailed { .. } => Guidance::ContactSupport,
            Self::InvalidEmail | Self::InvalidHandle => Guidance::FixInput,
        }
    }
}

/// Errors raised by challenge and verified-record stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A verified record already exists for the email
    #[error("Email already has a verified record")]
    DuplicateEmail,

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<StoreError> for VerificationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => VerificationError::DuplicateEmail,
            StoreError::Unavailable { message } => VerificationError::StoreUnavailable { message },
        }
    }
}
