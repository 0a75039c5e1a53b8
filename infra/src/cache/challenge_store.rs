//! Redis implementation of the ChallengeStore trait
//!
//! Layout:
//! - `{prefix}:challenge:handle:{handle}` holds the challenge as JSON
//! - `{prefix}:challenge:email:{email}` is a set of handles with a challenge
//!   addressed to that email
//!
//! Keys expire a retention window after the challenge itself, so a late
//! response still finds the challenge and is told it expired.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::Script;

use hq_core::domain::entities::{Challenge, Key};
use hq_core::errors::StoreError;
use hq_core::repositories::ChallengeStore;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Deletes the handle key only while it still holds the given JSON.
/// KEYS: handle key, email key. ARGV: challenge JSON, handle.
const DELETE_IF_CURRENT: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('DEL', KEYS[1])
    redis.call('SREM', KEYS[2], ARGV[2])
    return 1
end
return 0
";

/// Challenge store on Redis
pub struct RedisChallengeStore {
    client: RedisClient,
    retention: Duration,
}

impl RedisChallengeStore {
    pub fn new(client: RedisClient, retention: Duration) -> Self {
        Self { client, retention }
    }

    fn handle_key(&self, handle: &str) -> String {
        self.client.key(&["challenge", "handle", handle])
    }

    fn email_key(&self, email: &str) -> String {
        self.client.key(&["challenge", "email", email])
    }

    async fn load(&self, handle: &str) -> Result<Option<Challenge>, InfrastructureError> {
        match self.client.get(&self.handle_key(handle)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn delete_handle(&self, handle: &str) -> Result<(), InfrastructureError> {
        let existing = self.load(handle).await?;

        let mut pipe = redis::pipe();
        pipe.del(self.handle_key(handle)).ignore();
        if let Some(challenge) = existing {
            pipe.srem(self.email_key(&challenge.email), handle).ignore();
        }
        self.client.atomic(pipe).await
    }

    async fn delete_email(&self, email: &str) -> Result<(), InfrastructureError> {
        let email_key = self.email_key(email);
        for handle in self.client.set_members(&email_key).await? {
            // The set can lag behind a re-issue to another address
            match self.load(&handle).await? {
                Some(challenge) if challenge.email == email => {
                    self.client.delete(&self.handle_key(&handle)).await?;
                }
                _ => {}
            }
        }
        self.client.delete(&email_key).await?;
        Ok(())
    }
}

/// Seconds a key should live for a challenge expiring at `expires_at`
pub(crate) fn key_ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>, retention: Duration) -> u64 {
    let remaining = (expires_at - now) + retention;
    remaining.num_seconds().max(1) as u64
}

#[async_trait]
impl ChallengeStore for RedisChallengeStore {
    async fn put(&self, challenge: Challenge) -> Result<(), StoreError> {
        let previous = self.load(&challenge.handle).await?;

        let ttl = key_ttl_seconds(challenge.expires_at, Utc::now(), self.retention);
        let json = serde_json::to_string(&challenge).map_err(InfrastructureError::from)?;

        let mut pipe = redis::pipe();
        pipe.set_ex(self.handle_key(&challenge.handle), json, ttl).ignore();
        if let Some(previous) = previous.filter(|p| p.email != challenge.email) {
            pipe.srem(self.email_key(&previous.email), &challenge.handle).ignore();
        }
        let email_key = self.email_key(&challenge.email);
        pipe.sadd(&email_key, &challenge.handle).ignore();
        pipe.expire(&email_key, ttl as i64).ignore();

        self.client.atomic(pipe).await?;
        Ok(())
    }

    async fn get(&self, handle: &str) -> Result<Option<Challenge>, StoreError> {
        Ok(self.load(handle).await?)
    }

    async fn delete(&self, key: &Key) -> Result<(), StoreError> {
        match key {
            Key::Handle(handle) => self.delete_handle(handle).await?,
            Key::Email(email) => self.delete_email(email).await?,
        }
        Ok(())
    }

    async fn delete_if_current(&self, challenge: &Challenge) -> Result<bool, StoreError> {
        // Stored JSON is what put serialized, and serialization is deterministic
        let json = serde_json::to_string(challenge).map_err(InfrastructureError::from)?;
        let keys = [self.handle_key(&challenge.handle), self.email_key(&challenge.email)];
        let args = [json, challenge.handle.clone()];
        let removed = self.client.eval_script(&Script::new(DELETE_IF_CURRENT), &keys, &args).await?;
        Ok(removed == 1)
    }

    async fn purge_expired(&self, _cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        // Key expiry already removes challenges once the retention window passes
        Ok(0)
    }
}
