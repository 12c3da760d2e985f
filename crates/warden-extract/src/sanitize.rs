//! Raw log content sanitation.

/// Remote log files occasionally interleave NUL bytes into otherwise valid
/// UTF-8 text. They must be removed before any pattern matching.
pub fn strip_nul_bytes(raw: &str) -> String {
    if raw.contains('\u{0}') {
        raw.replace('\u{0}', "")
    } else {
        raw.to_string()
    }
}
