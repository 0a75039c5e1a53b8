use async_trait::async_trait;

use crate::domain::entities::VerifiedRecord;
use crate::errors::StoreError;

/// Durable storage for verified records, unique by email
#[async_trait]
pub trait VerifiedStore: Send + Sync {
    /// Insert a record
    ///
    /// Fails with [`StoreError::DuplicateEmail`] when the email already has a
    /// record. Uniqueness must hold under concurrent inserts.
    async fn put(&self, record: VerifiedRecord) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<VerifiedRecord>, StoreError>;

    /// All records held by a handle
    async fn find_by_handle(&self, handle: &str) -> Result<Vec<VerifiedRecord>, StoreError>;

    /// Check whether an email has a verified record
    async fn is_verified(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}
