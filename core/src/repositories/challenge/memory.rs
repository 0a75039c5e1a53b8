//! Process-local challenge store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{Challenge, Key};
use crate::errors::StoreError;

use super::r#trait::ChallengeStore;

/// Challenge store backed by a map keyed by handle
///
/// All state is lost when the process exits.
#[derive(Clone)]
pub struct InMemoryChallengeStore {
    challenges: Arc<RwLock<HashMap<String, Challenge>>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self {
            challenges: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored challenges, expired ones included
    pub async fn len(&self) -> usize {
        self.challenges.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.challenges.read().await.is_empty()
    }
}

impl Default for InMemoryChallengeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn put(&self, challenge: Challenge) -> Result<(), StoreError> {
        let mut challenges = self.challenges.write().await;
        challenges.insert(challenge.handle.clone(), challenge);
        Ok(())
    }

    async fn get(&self, handle: &str) -> Result<Option<Challenge>, StoreError> {
        let challenges = self.challenges.read().await;
        Ok(challenges.get(handle).cloned())
    }

    async fn delete(&self, key: &Key) -> Result<(), StoreError> {
        let mut challenges = self.challenges.write().await;
        match key {
            Key::Handle(handle) => {
                challenges.remove(handle);
            }
            Key::Email(email) => {
                challenges.retain(|_, c| &c.email != email);
            }
        }
        Ok(())
    }

    async fn delete_if_current(&self, challenge: &Challenge) -> Result<bool, StoreError> {
        let mut challenges = self.challenges.write().await;
        if challenges.get(&challenge.handle) == Some(challenge) {
            challenges.remove(&challenge.handle);
            return Ok(true);
        }
        Ok(false)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut challenges = self.challenges.write().await;
        let before = challenges.len();
        challenges.retain(|_, c| c.expires_at >= cutoff);
        Ok((before - challenges.len()) as u64)
    }
}
