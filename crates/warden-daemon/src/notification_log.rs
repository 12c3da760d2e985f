//! Log-based notification sink.
//!
//! This deployment has no chat platform wired in; pipeline notifications go
//! to the structured log instead, where an operator (or a log shipper) can
//! pick them up.

use async_trait::async_trait;
use tracing::info;

use warden_core::{GuildId, PlayerId};
use warden_pipeline::NotificationSink;

pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn login_activity(&self, guild_id: &GuildId, line: &str) {
        info!(guild = %guild_id, line, "login activity");
    }

    async fn chat_message(&self, guild_id: &GuildId, line: &str) {
        info!(guild = %guild_id, line, "chat message");
    }

    async fn player_joined(&self, guild_id: &GuildId, player_id: &PlayerId, ip_address: &str) {
        info!(guild = %guild_id, player = %player_id, ip = ip_address, "player joined for the first time");
    }
}
