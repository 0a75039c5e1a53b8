use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Challenge, Key};
use crate::errors::StoreError;

/// Storage for pending challenges, at most one per handle
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Insert or atomically replace the challenge for `challenge.handle`
    ///
    /// After this returns, no reader may observe the previous code.
    async fn put(&self, challenge: Challenge) -> Result<(), StoreError>;

    /// Fetch the current challenge for a handle
    async fn get(&self, handle: &str) -> Result<Option<Challenge>, StoreError>;

    /// Remove challenges by handle, or every challenge addressed to an email
    ///
    /// Deleting something that does not exist is not an error.
    async fn delete(&self, key: &Key) -> Result<(), StoreError>;

    /// Remove `challenge` only if it is still the one stored for its handle
    ///
    /// A challenge re-issued since `challenge` was read survives. Returns
    /// whether anything was removed.
    async fn delete_if_current(&self, challenge: &Challenge) -> Result<bool, StoreError>;

    /// Drop challenges whose expiry is before `cutoff`, returning how many
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
