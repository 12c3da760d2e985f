//! Time helpers for game-log timestamps and wall-clock bookkeeping.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Log timestamps arrive in the remote server's dotted layout, for example
/// `2023.12.19-17.18.57`.
const GAME_LOG_TIMESTAMP_LAYOUT: &str = "%Y.%m.%d-%H.%M.%S";

/// Converts a dotted game-log timestamp into a UTC point in time. Returns
/// `None` for anything that does not parse as a real calendar instant.
pub fn parse_game_log_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), GAME_LOG_TIMESTAMP_LAYOUT)
        .ok()
        .map(|naive| naive.and_utc())
}
