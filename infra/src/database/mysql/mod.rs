//! MySQL store implementations

pub mod challenge_store_impl;
pub mod verified_store_impl;

pub use challenge_store_impl::MySqlChallengeStore;
pub use verified_store_impl::MySqlVerifiedStore;
