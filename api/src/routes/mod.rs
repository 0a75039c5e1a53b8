//! Route handlers
//!
//! - `verification` - begin, respond and status for the authenticated sender
//! - `admin` - challenge revocation
//! - `health` - backend health for load balancers

pub mod admin;
pub mod health;
pub mod verification;
