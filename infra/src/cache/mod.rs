//! Cache module for Redis-backed challenge storage
//!
//! Provides a Redis client with retry logic and a ChallengeStore that keeps
//! challenges as expiring keys.

pub mod challenge_store;
pub mod redis_client;


pub use challenge_store::RedisChallengeStore;
pub use redis_client::RedisClient;
