//! JSON-file backed account store.
//!
//! All account state is held in memory and flushed to a single JSON file on
//! every mutation, with a temp-file rename so a crash mid-write never leaves
//! a truncated state file behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use warden_core::{persist_json_atomic, GuildId, PlayerId};
use warden_ledger::{Account, AccountStore};

const ACCOUNT_STATE_SCHEMA_VERSION: u32 = 1;

fn account_state_schema_version() -> u32 {
    ACCOUNT_STATE_SCHEMA_VERSION
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountStateFile {
    #[serde(default = "account_state_schema_version")]
    schema_version: u32,
    #[serde(default)]
    guilds: HashMap<GuildId, HashMap<PlayerId, Account>>,
}

pub struct JsonFileAccountStore {
    path: PathBuf,
    state: Mutex<HashMap<GuildId, HashMap<PlayerId, Account>>>,
}

impl JsonFileAccountStore {
    /// Loads existing state from `path`; a missing file starts empty.
    pub fn load(path: &Path) -> Result<Self> {
        let guilds = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read account state {}", path.display()))?;
            let file: AccountStateFile = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse account state {}", path.display()))?;
            file.guilds
        } else {
            info!(path = %path.display(), "account state file absent; starting empty");
            HashMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(guilds),
        })
    }

    fn persist(&self, guilds: &HashMap<GuildId, HashMap<PlayerId, Account>>) -> Result<()> {
        let file = AccountStateFile {
            schema_version: ACCOUNT_STATE_SCHEMA_VERSION,
            guilds: guilds.clone(),
        };
        persist_json_atomic(&self.path, &file)
    }
}

#[async_trait]
impl AccountStore for JsonFileAccountStore {
    async fn account(&self, guild_id: &GuildId, player_id: &PlayerId) -> Result<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .get(guild_id)
            .and_then(|accounts| accounts.get(player_id))
            .cloned())
    }

    async fn upsert_player(
        &self,
        guild_id: &GuildId,
        player_id: &PlayerId,
        display_name: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let accounts = state.entry(guild_id.clone()).or_default();
        accounts
            .entry(player_id.clone())
            .and_modify(|account| account.display_name = display_name.to_string())
            .or_insert_with(|| Account::new(player_id.clone(), display_name));
        self.persist(&state)
    }

    async fn adjust_balance(
        &self,
        guild_id: &GuildId,
        player_id: &PlayerId,
        delta: i64,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some(account) = state
            .get_mut(guild_id)
            .and_then(|accounts| accounts.get_mut(player_id))
        else {
            bail!("no account for player '{player_id}' in guild '{guild_id}'");
        };
        account.balance += delta;
        self.persist(&state)
    }

    async fn record_welcome_kit_use(
        &self,
        guild_id: &GuildId,
        player_id: &PlayerId,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some(account) = state
            .get_mut(guild_id)
            .and_then(|accounts| accounts.get_mut(player_id))
        else {
            bail!("no account for player '{player_id}' in guild '{guild_id}'");
        };
        account.welcome_kit_uses += 1;
        self.persist(&state)
    }

    async fn clear_first_join(&self, guild_id: &GuildId, player_id: &PlayerId) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some(account) = state
            .get_mut(guild_id)
            .and_then(|accounts| accounts.get_mut(player_id))
        else {
            bail!("no account for player '{player_id}' in guild '{guild_id}'");
        };
        account.first_join_pending = false;
        self.persist(&state)
    }
}
