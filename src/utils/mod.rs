//! Shared helpers: path normalization, lossy text reading, hashing, token
//! estimation.

pub mod encoding;
pub mod hashing;
pub mod paths;
pub mod tokens;

pub use encoding::read_text_lossy;
pub use hashing::content_hash;
pub use paths::normalize_path;
pub use tokens::estimate_tokens;
