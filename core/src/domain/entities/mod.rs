//! Domain entities representing core business objects.

pub mod challenge;
pub mod identity;
pub mod verified_record;

pub use challenge::{Challenge, CODE_LENGTH, DEFAULT_CHALLENGE_TTL_HOURS};
pub use identity::{IdentityKey, Key};
pub use verified_record::VerifiedRecord;
