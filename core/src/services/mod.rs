//! Business services for the verification workflow.

pub mod clock;
pub mod code_generator;
pub mod maintenance;
pub mod verification;

pub use clock::{Clock, SystemClock};
pub use code_generator::{CodeGenerator, OsRngCodeGenerator};
pub use maintenance::{
    ChallengeSweepConfig, ChallengeSweepService, GrantRetryConfig, GrantRetryQueue,
    GrantRetryService, InMemoryGrantRetryQueue, PendingGrant, RetryPassResult,
};
pub use verification::{
    AccessGrantPort, BeginOutcome, GrantStatus, IdentityState, NotificationPort,
    VerificationService, VerificationServiceConfig, VerifyOutcome,
};
