//! Token estimation

/// Estimate tokens from a byte count using the rough 4-chars-per-token rule.
pub fn estimate_tokens(size_bytes: u64) -> u64 {
    size_bytes / 4
}
