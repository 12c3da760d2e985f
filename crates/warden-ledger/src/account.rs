//! The external account store seam.
//!
//! The authoritative account state (balances, roles, welcome-kit usage)
//! lives outside the core; the pipeline only reads it and issues deltas.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use warden_core::{GuildId, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub player_id: PlayerId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub welcome_kit_uses: u32,
    /// Set until the player's first observed login; cleared after the
    /// first-join teleport has been issued.
    #[serde(default)]
    pub first_join_pending: bool,
}

impl Account {
    pub fn new(player_id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            player_id,
            display_name: display_name.into(),
            balance: 0,
            roles: Vec::new(),
            welcome_kit_uses: 0,
            first_join_pending: true,
        }
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn account(&self, guild_id: &GuildId, player_id: &PlayerId) -> Result<Option<Account>>;

    /// Creates the account if absent, refreshing the display name either way.
    async fn upsert_player(
        &self,
        guild_id: &GuildId,
        player_id: &PlayerId,
        display_name: &str,
    ) -> Result<()>;

    /// Applies a signed balance delta. Credits are positive, debits negative;
    /// the store never rejects a delta on balance grounds (the dispatcher
    /// guards before debiting).
    async fn adjust_balance(
        &self,
        guild_id: &GuildId,
        player_id: &PlayerId,
        delta: i64,
    ) -> Result<()>;

    async fn record_welcome_kit_use(&self, guild_id: &GuildId, player_id: &PlayerId)
        -> Result<()>;

    async fn clear_first_join(&self, guild_id: &GuildId, player_id: &PlayerId) -> Result<()>;
}
