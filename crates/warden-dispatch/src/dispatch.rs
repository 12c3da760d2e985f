//! Command resolution, balance enforcement, and agent hand-off.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use warden_agent::{AgentInstruction, AgentRegistry};
use warden_core::{GuildId, PlayerId};
use warden_extract::Coordinates;
use warden_ledger::{Account, AccountStore};

use crate::notice::{
    chat_display_name, insufficient_balance_notice, unauthorized_package_notice,
    unknown_package_notice, unknown_teleport_notice, welcome_kit_balance_notice,
};
use crate::package::PackageStore;

/// The repeatable starter package whose cost escalates with each use.
pub const WELCOME_KIT_COMMAND: &str = "welcomepack";

/// Cost added on top for every prior welcome-kit use.
pub const WELCOME_KIT_COST_INCREMENT: i64 = 5000;

/// The teleport command family bypasses the package store entirely.
pub const TELEPORT_COMMAND: &str = "teleport";

/// One accepted chat command awaiting dispatch, FIFO per tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub player_id: PlayerId,
    pub command_name: String,
    /// Full message as typed, used for command arguments.
    pub raw_line: String,
}

pub struct CommandDispatcher {
    guild_id: GuildId,
    accounts: Arc<dyn AccountStore>,
    packages: Arc<dyn PackageStore>,
    agents: AgentRegistry,
    /// Named teleport coordinate sets from the tenant's configuration.
    teleport_locations: HashMap<String, Coordinates>,
}

impl CommandDispatcher {
    pub fn new(
        guild_id: GuildId,
        accounts: Arc<dyn AccountStore>,
        packages: Arc<dyn PackageStore>,
        agents: AgentRegistry,
        teleport_locations: HashMap<String, Coordinates>,
    ) -> Self {
        Self {
            guild_id,
            accounts,
            packages,
            agents,
            teleport_locations,
        }
    }

    pub fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    /// Processes one queue entry to completion. Domain faults end with a
    /// player notice or a silent drop; none of them are errors to the
    /// worker loop.
    pub async fn process(&self, entry: QueueEntry) {
        let account = match self.accounts.account(&self.guild_id, &entry.player_id).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                // Cannot charge or notify an unknown account.
                debug!(
                    guild = %self.guild_id,
                    player = %entry.player_id,
                    command = %entry.command_name,
                    "dropping command from unknown account"
                );
                return;
            }
            Err(error) => {
                warn!(
                    guild = %self.guild_id,
                    player = %entry.player_id,
                    %error,
                    "dropping command: account store lookup failed"
                );
                return;
            }
        };
        let display_name = chat_display_name(&account.display_name);

        if entry.command_name == TELEPORT_COMMAND {
            self.process_teleport(&entry, &display_name);
            return;
        }

        let package = match self
            .packages
            .package(&self.guild_id, &entry.command_name)
            .await
        {
            Ok(Some(package)) => package,
            Ok(None) => {
                self.notify_player(unknown_package_notice(&display_name, &entry.command_name));
                return;
            }
            Err(error) => {
                warn!(
                    guild = %self.guild_id,
                    command = %entry.command_name,
                    %error,
                    "dropping command: package store lookup failed"
                );
                return;
            }
        };

        // Role-gated packages are refused before any balance check so the
        // player is told why, not just that they cannot afford it.
        if let Some(required_role) = &package.required_role {
            if !account.roles.iter().any(|held| held == required_role) {
                self.notify_player(unauthorized_package_notice(
                    &display_name,
                    &entry.command_name,
                ));
                return;
            }
        }

        if entry.command_name == WELCOME_KIT_COMMAND {
            self.process_welcome_kit(&entry, &account, &display_name, package.items)
                .await;
            return;
        }

        if account.balance < package.cost {
            self.notify_player(insufficient_balance_notice(&display_name));
            return;
        }
        if package.cost > 0 {
            if let Err(error) = self
                .accounts
                .adjust_balance(&self.guild_id, &entry.player_id, -package.cost)
                .await
            {
                warn!(
                    guild = %self.guild_id,
                    player = %entry.player_id,
                    cost = package.cost,
                    %error,
                    "debit failed; command still dispatched"
                );
            }
        }
        self.run_package(&entry.player_id, package.items);
    }

    /// Welcome-kit pricing escalates with prior uses: the package's base
    /// cost plus a fixed increment per recorded use.
    async fn process_welcome_kit(
        &self,
        entry: &QueueEntry,
        account: &Account,
        display_name: &str,
        items: Vec<String>,
    ) {
        let escalated_cost = welcome_kit_cost(account.welcome_kit_uses);
        if account.balance < escalated_cost {
            self.notify_player(welcome_kit_balance_notice(display_name));
            return;
        }
        if let Err(error) = self
            .accounts
            .record_welcome_kit_use(&self.guild_id, &entry.player_id)
            .await
        {
            warn!(guild = %self.guild_id, player = %entry.player_id, %error, "failed to record welcome kit use");
        }
        if let Err(error) = self
            .accounts
            .adjust_balance(&self.guild_id, &entry.player_id, -escalated_cost)
            .await
        {
            warn!(
                guild = %self.guild_id,
                player = %entry.player_id,
                cost = escalated_cost,
                %error,
                "welcome kit debit failed; command still dispatched"
            );
        }
        info!(
            guild = %self.guild_id,
            player = %entry.player_id,
            cost = escalated_cost,
            uses = account.welcome_kit_uses + 1,
            "welcome kit dispatched"
        );
        self.run_package(&entry.player_id, items);
    }

    fn process_teleport(&self, entry: &QueueEntry, display_name: &str) {
        let location_name = entry
            .raw_line
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_ascii_lowercase();
        let Some(coordinates) = self.teleport_locations.get(&location_name) else {
            self.notify_player(unknown_teleport_notice(display_name, &location_name));
            return;
        };
        self.agents.send(AgentInstruction::Teleport {
            guild_id: self.guild_id.clone(),
            x: coordinates.x,
            y: coordinates.y,
            z: coordinates.z,
            player_id: entry.player_id.to_string(),
        });
    }

    fn run_package(&self, player_id: &PlayerId, items: Vec<String>) {
        self.agents.send(AgentInstruction::RunCommand {
            guild_id: self.guild_id.clone(),
            package_items: items,
            player_id: player_id.to_string(),
        });
    }

    fn notify_player(&self, message: String) {
        self.agents.send(AgentInstruction::AnnounceMessage {
            guild_id: self.guild_id.clone(),
            message,
        });
    }
}

/// Cost of the next welcome-kit use given the number of prior uses.
pub fn welcome_kit_cost(prior_uses: u32) -> i64 {
    WELCOME_KIT_COST_INCREMENT * (i64::from(prior_uses) + 1)
}
