//! Content digests for remote log change detection.
//!
//! A stream cycle hashes the full stripped file content; when the digest
//! matches the previous cycle the file is unchanged and the cycle ends early.

use sha2::{Digest, Sha256};

/// SHA-256 digest over a log file's stripped contents.
pub type ContentDigest = [u8; 32];

pub fn content_digest(contents: &str) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    hasher.finalize().into()
}

/// Lowercase hex rendering, used only for diagnostics.
pub fn digest_hex(digest: &ContentDigest) -> String {
    let mut rendered = String::with_capacity(digest.len() * 2);
    for byte in digest {
        rendered.push_str(&format!("{byte:02x}"));
    }
    rendered
}
