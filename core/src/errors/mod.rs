//! Domain-specific error types and error handling.

mod types;

pub use types::{Guidance, StoreError, VerificationError};

pub type VerificationResult<T> = Result<T, VerificationError>;
