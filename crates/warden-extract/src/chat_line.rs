//! Chat-log line extraction.
//!
//! A chat record carries a channel tag followed by the message text:
//!
//! ```text
//! 2023.12.19-17.20.11: '76561198244922296:jacobdgraham02(2)' 'Local: /welcomepack'
//! ```
//!
//! Only messages beginning with the command marker are candidate commands;
//! everything else is plain chat and flows to the notification sink.

use std::sync::LazyLock;

use regex::Regex;

use warden_core::PlayerId;

/// Marker character a chat message must start with to be treated as a
/// command, unless the tenant configures a different one.
pub const DEFAULT_COMMAND_MARKER: char = '/';

static CHANNEL_MESSAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Local|Global|Admin|Squad): (?P<message>[^\n]+)")
        .expect("chat channel regex must compile")
});

static PLAYER_ID_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{17}").expect("player id token regex must compile"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCommandEvent {
    pub player_id: PlayerId,
    pub command_name: String,
    /// The full message as typed, marker included, for argument parsing by
    /// the command definition.
    pub raw_line: String,
}

/// Extracts a candidate command from one chat-log line, or `None` when the
/// line is not a channel-tagged command from an identifiable player.
pub fn extract_chat_command(line: &str, marker: char) -> Option<ChatCommandEvent> {
    let captures = CHANNEL_MESSAGE_REGEX.captures(line)?;
    let message = captures["message"].trim_end_matches('\'').trim();
    if !message.starts_with(marker) {
        return None;
    }

    // The id token appears earlier on the line than the channel tag.
    let tag_offset = captures.get(0).map(|m| m.start()).unwrap_or_default();
    let id_match = PLAYER_ID_TOKEN_REGEX
        .find_iter(&line[..tag_offset])
        .next()?;
    let player_id = PlayerId::parse(id_match.as_str())?;

    let stripped = &message[marker.len_utf8()..];
    let command_name = stripped.split_whitespace().next()?.to_string();

    Some(ChatCommandEvent {
        player_id,
        command_name,
        raw_line: message.to_string(),
    })
}
