//! Best-effort text reading with encoding fallback.
//!
//! Source files are read as UTF-8 when possible; everything else goes through
//! chardetng detection and a lossy decode that replaces invalid bytes instead
//! of failing the scan.

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::UTF_8;
use std::fs;
use std::path::Path;

/// Read a file as text, replacing undecodable bytes.
///
/// Strategy:
/// 1. Strict UTF-8 fast path (covers nearly all modern source files)
/// 2. chardetng guess over the full content, lossy decode
/// 3. UTF-8 lossy decode as the last resort
pub fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed reading file: {}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let bytes = err.into_bytes();
            let mut detector = EncodingDetector::new();
            detector.feed(&bytes, true);
            let encoding = detector.guess(None, true);
            if encoding != UTF_8 {
                let (decoded, _, _) = encoding.decode(&bytes);
                return Ok(decoded.into_owned());
            }
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}
