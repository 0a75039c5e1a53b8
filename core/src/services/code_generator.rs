//! Challenge code generation

use rand::{rngs::OsRng, Rng};

use crate::domain::entities::CODE_LENGTH;

/// Produces unpredictable fixed-length numeric codes
pub trait CodeGenerator: Send + Sync {
    /// Generate a [`CODE_LENGTH`]-digit decimal string
    fn generate(&self) -> String;
}

/// Code generator backed by the operating system's CSPRNG
///
/// Each digit is drawn independently and uniformly from 0-9, so leading zeros
/// are as likely as any other digit.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngCodeGenerator;

impl CodeGenerator for OsRngCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = OsRng;
        (0..CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}
