//! The notification sink seam.
//!
//! Cross-cutting "something happened" messages (chat relay, login relay,
//! first-join announcements) leave the core through this trait instead of a
//! global listener registration. The production sink forwards to whatever
//! chat platform the deployment integrates; tests capture the calls.

use async_trait::async_trait;

use warden_core::{GuildId, PlayerId};

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// A raw line from the login log, already NUL-stripped.
    async fn login_activity(&self, guild_id: &GuildId, line: &str);

    /// A non-command chat line.
    async fn chat_message(&self, guild_id: &GuildId, line: &str);

    /// A player logged in for the first time.
    async fn player_joined(&self, guild_id: &GuildId, player_id: &PlayerId, ip_address: &str);
}
