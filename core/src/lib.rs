//! # Harlequin Core
//!
//! Domain layer for email ownership verification. This crate holds the
//! challenge/verified-record entities, the store contracts, the outbound
//! ports and the verification state machine that drives them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
