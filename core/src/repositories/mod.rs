//! Store contracts and in-process implementations.

pub mod challenge;
pub mod verified;

pub use challenge::{ChallengeStore, InMemoryChallengeStore};
pub use verified::{InMemoryVerifiedStore, VerifiedStore};
