//! Domain layer containing the verification entities.

pub mod entities;

pub use entities::*;
