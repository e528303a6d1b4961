//! Stable content hashing

use sha2::{Digest, Sha256};

/// SHA-256 of the content, truncated to 16 hex chars. Used to detect stale
/// cached content, not for security.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}
