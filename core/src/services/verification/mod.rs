//! Email verification state machine
//!
//! Per handle an identity is Unverified (no challenge, no record), Pending
//! (an unexpired challenge exists) or Verified (a record exists). Expiry is
//! computed from the clock, never stored as a state.

mod config;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use traits::{AccessGrantPort, NotificationPort};
pub use types::{BeginOutcome, GrantStatus, IdentityState, VerifyOutcome};
