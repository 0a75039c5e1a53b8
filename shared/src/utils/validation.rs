//! Validation and log-masking helpers for identities

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum accepted email length (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum accepted handle length
pub const MAX_HANDLE_LENGTH: usize = 128;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$")
        .expect("email regex is valid")
});

/// Normalize an email address for storage and lookups
///
/// Surrounding whitespace is dropped and the address is lowercased so that
/// `JSmith01@Example.edu` and `jsmith01@example.edu` are the same key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check if an (already normalized) email address is well formed
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Check if a platform handle is acceptable as an identity key
pub fn is_valid_handle(handle: &str) -> bool {
    let trimmed = handle.trim();
    !trimmed.is_empty()
        && trimmed.len() == handle.len()
        && handle.len() <= MAX_HANDLE_LENGTH
        && !handle.chars().any(char::is_control)
}

/// Mask an email address for logging
///
/// Keeps the first character of the local part and the full domain:
/// `jsmith01@example.edu` becomes `j***@example.edu`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
