//! ID generation for locally minted records.
//!
//! Uses short, human-readable slugs: it-xxxxxxxx

use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix for iteration IDs
const ITERATION_PREFIX: &str = "it";

/// Length of the random suffix (in base36 chars)
const SUFFIX_LEN: usize = 8;

const CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a base36 suffix from OS randomness.
fn base36_suffix(len: usize) -> String {
    let mut bytes = [0u8; 8];
    if getrandom::fill(&mut bytes).is_err() {
        // No entropy source: fall back to the clock.
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        bytes = (nanos as u64).to_le_bytes();
    }

    let mut n = u64::from_le_bytes(bytes);
    let mut result = String::with_capacity(len);
    while result.len() < len {
        result.push(CHARS[(n % 36) as usize] as char);
        n /= 36;
    }
    result
}

/// Generate a new iteration ID (e.g., "it-1d3f9xk2")
#[must_use]
pub fn new_iteration_id() -> String {
    format!("{}-{}", ITERATION_PREFIX, base36_suffix(SUFFIX_LEN))
}

/// Check if a string looks like a valid iteration ID
#[must_use]
pub fn is_iteration_id(s: &str) -> bool {
    s.len() == ITERATION_PREFIX.len() + 1 + SUFFIX_LEN
        && s.starts_with("it-")
        && s[3..].bytes().all(|b| CHARS.contains(&b))
}
