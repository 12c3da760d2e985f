//! Login-log line extraction.
//!
//! A login record looks like:
//!
//! ```text
//! 2023.12.19-17.18.57: '72.140.43.39 76561198244922296:jacobdgraham02(2)' logged in at: X=218481.953 Y=243331.516 Z=28960.289
//! ```
//!
//! The quoted field carries the origin address, the 17-digit account id, the
//! display name, and a per-name disambiguation counter. The trailing
//! coordinate triple is present on most, but not all, records.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use warden_core::{parse_game_log_timestamp, PlayerId};

static LOGIN_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<ts>\d{4}\.\d{2}\.\d{2}-\d{2}\.\d{2}\.\d{2}): '(?P<ip>\d{1,3}(?:\.\d{1,3}){3}) (?P<id>\d{17}):(?P<name>.*?)\((?P<counter>\d{1,10})\)' logged (?P<dir>in|out)(?: at: X=(?P<x>-?\d+(?:\.\d+)?) Y=(?P<y>-?\d+(?:\.\d+)?) Z=(?P<z>-?\d+(?:\.\d+)?))?",
    )
    .expect("login line regex must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginDirection {
    LoggedIn,
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginEvent {
    pub player_id: PlayerId,
    pub display_name: String,
    pub ip_address: String,
    pub timestamp: DateTime<Utc>,
    pub direction: LoginDirection,
    pub coordinates: Option<Coordinates>,
}

/// Result of running one login-log line through the extractor.
///
/// `InvalidTimestamp` is reported separately from `NoMatch` because the
/// pipeline drops such lines with a diagnostic instead of silently.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginLineOutcome {
    Event(LoginEvent),
    InvalidTimestamp { raw_timestamp: String },
    NoMatch,
}

pub fn extract_login_event(line: &str) -> LoginLineOutcome {
    let Some(captures) = LOGIN_LINE_REGEX.captures(line) else {
        return LoginLineOutcome::NoMatch;
    };

    let raw_timestamp = &captures["ts"];
    let Some(timestamp) = parse_game_log_timestamp(raw_timestamp) else {
        return LoginLineOutcome::InvalidTimestamp {
            raw_timestamp: raw_timestamp.to_string(),
        };
    };

    // The id group is exactly 17 digits by construction of the regex.
    let Some(player_id) = PlayerId::parse(&captures["id"]) else {
        return LoginLineOutcome::NoMatch;
    };

    let direction = if &captures["dir"] == "in" {
        LoginDirection::LoggedIn
    } else {
        LoginDirection::LoggedOut
    };

    let coordinates = match (captures.name("x"), captures.name("y"), captures.name("z")) {
        (Some(x), Some(y), Some(z)) => {
            match (
                x.as_str().parse::<f64>(),
                y.as_str().parse::<f64>(),
                z.as_str().parse::<f64>(),
            ) {
                (Ok(x), Ok(y), Ok(z)) => Some(Coordinates { x, y, z }),
                _ => None,
            }
        }
        _ => None,
    };

    LoginLineOutcome::Event(LoginEvent {
        player_id,
        display_name: captures["name"].to_string(),
        ip_address: captures["ip"].to_string(),
        timestamp,
        direction,
        coordinates,
    })
}
