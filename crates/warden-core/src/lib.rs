//! Foundational primitives shared across Warden crates.
//!
//! Provides tenant/player identifiers, game-log timestamp parsing, and the
//! content digest used for change detection on remote log streams.

pub mod atomic_io;
pub mod digest;
pub mod ids;
pub mod time_utils;

pub use atomic_io::persist_json_atomic;
pub use digest::{content_digest, digest_hex, ContentDigest};
pub use ids::{GuildId, PlayerId};
pub use time_utils::parse_game_log_timestamp;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_log_timestamp_round_trips_to_utc() {
        let parsed = parse_game_log_timestamp("2023.12.19-17.18.57").expect("timestamp");
        assert_eq!(parsed.to_rfc3339(), "2023-12-19T17:18:57+00:00");
    }

    #[test]
    fn content_digest_is_stable_and_order_sensitive() {
        let first = content_digest("line one\nline two\n");
        let second = content_digest("line one\nline two\n");
        let reversed = content_digest("line two\nline one\n");
        assert_eq!(first, second);
        assert_ne!(first, reversed);
    }

    #[test]
    fn player_id_requires_seventeen_digits() {
        assert!(PlayerId::parse("76561198244922296").is_some());
        assert!(PlayerId::parse("7656119824492229").is_none());
        assert!(PlayerId::parse("76561198244922296a").is_none());
        assert!(PlayerId::parse("").is_none());
    }
}
