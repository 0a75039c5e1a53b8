//! Process-local verified-record store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::VerifiedRecord;
use crate::errors::StoreError;

use super::r#trait::VerifiedStore;

/// Verified store backed by a map keyed by email
#[derive(Clone)]
pub struct InMemoryVerifiedStore {
    records: Arc<RwLock<HashMap<String, VerifiedRecord>>>,
}

impl InMemoryVerifiedStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryVerifiedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerifiedStore for InMemoryVerifiedStore {
    async fn put(&self, record: VerifiedRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.email) {
            return Err(StoreError::DuplicateEmail);
        }
        records.insert(record.email.clone(), record);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<VerifiedRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(email).cloned())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Vec<VerifiedRecord>, StoreError> {
        let records = self.records.read().await;
        let mut found: Vec<VerifiedRecord> = records
            .values()
            .filter(|r| r.handle == handle)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.verified_at.cmp(&b.verified_at));
        Ok(found)
    }
}
