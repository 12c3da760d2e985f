//! Tenant and player identifier newtypes.
//!
//! Every tenant-scoped map in the system is keyed by one of these types so
//! that cross-tenant mixups are a compile error rather than a string-format
//! convention.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifies one tenant (a "guild"): an independently configured game-server
/// monitoring instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(String);

impl GuildId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for GuildId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuildId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A 17-digit numeric platform account id as it appears in the game server's
/// log files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

pub const PLAYER_ID_DIGITS: usize = 17;

impl PlayerId {
    /// Accepts exactly seventeen ASCII digits; anything else is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() == PLAYER_ID_DIGITS && value.bytes().all(|byte| byte.is_ascii_digit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
