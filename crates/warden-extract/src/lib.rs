//! Pure line-to-event extraction for remote game-server logs.
//!
//! Two line shapes are recognized: login/logout records from the login log
//! and channel-tagged chat messages from the chat log. Extraction never
//! fails; unmatched input yields no event.

pub mod chat_line;
pub mod login_line;
pub mod sanitize;

pub use chat_line::{extract_chat_command, ChatCommandEvent, DEFAULT_COMMAND_MARKER};
pub use login_line::{
    extract_login_event, Coordinates, LoginDirection, LoginEvent, LoginLineOutcome,
};
pub use sanitize::strip_nul_bytes;
