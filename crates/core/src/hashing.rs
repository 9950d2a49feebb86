//! Content hashing for picture duplicate detection.

use sha2::{Digest, Sha256};

/// Length of a hex digest produced by [`sha256_hex`].
pub const CONTENT_HASH_LEN: usize = 64;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Returns `true` if `hash` looks like a digest produced by [`sha256_hex`].
pub fn is_content_hash(hash: &str) -> bool {
    hash.len() == CONTENT_HASH_LEN && hash.bytes().all(|b| b.is_ascii_hexdigit())
}
