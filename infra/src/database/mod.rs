//! Database module - MySQL implementations using SQLx
//!
//! Two tables back the verification stores:
//! - `challenges`, keyed by handle with a secondary index on email
//! - `verified`, keyed by email with a secondary index on handle

pub mod connection;
pub mod mysql;
pub mod schema;

#[cfg(test)]
mod tests;

pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlChallengeStore, MySqlVerifiedStore};
pub use schema::ensure_schema;
