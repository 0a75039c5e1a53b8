//! Background maintenance: deferred access grants and expired-challenge sweeps

mod challenge_sweep;
mod grant_retry;
mod retry_queue;


pub use challenge_sweep::{ChallengeSweepConfig, ChallengeSweepService};
pub use grant_retry::{GrantRetryConfig, GrantRetryService, RetryPassResult};
pub use retry_queue::{GrantRetryQueue, InMemoryGrantRetryQueue, PendingGrant};
