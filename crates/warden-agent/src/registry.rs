//! Connected-agent registry.
//!
//! Maps a guild id to the outbound channel of its live websocket session.
//! Exactly one agent per tenant: a newer connection for the same guild
//! replaces the previous sender.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use warden_core::GuildId;

use crate::protocol::AgentInstruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentSendOutcome {
    Sent,
    /// No live connection for the tenant; the instruction was dropped, not
    /// buffered.
    Dropped,
}

#[derive(Clone, Default)]
pub struct AgentRegistry {
    inner: Arc<Mutex<HashMap<GuildId, UnboundedSender<AgentInstruction>>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, guild_id: GuildId, sender: UnboundedSender<AgentInstruction>) {
        let mut connections = self.inner.lock().expect("agent registry lock poisoned");
        if connections.insert(guild_id.clone(), sender).is_some() {
            warn!(guild = %guild_id, "replaced an existing agent connection");
        }
    }

    pub fn unregister(&self, guild_id: &GuildId) {
        let mut connections = self.inner.lock().expect("agent registry lock poisoned");
        connections.remove(guild_id);
    }

    pub fn is_connected(&self, guild_id: &GuildId) -> bool {
        let connections = self.inner.lock().expect("agent registry lock poisoned");
        connections.contains_key(guild_id)
    }

    /// Fire-and-forget send to the instruction's tenant.
    pub fn send(&self, instruction: AgentInstruction) -> AgentSendOutcome {
        let guild_id = instruction.guild_id().clone();
        let sender = {
            let connections = self.inner.lock().expect("agent registry lock poisoned");
            connections.get(&guild_id).cloned()
        };
        let Some(sender) = sender else {
            warn!(
                guild = %guild_id,
                action = instruction.action(),
                "agent instruction dropped: no connected agent"
            );
            return AgentSendOutcome::Dropped;
        };
        if sender.send(instruction).is_err() {
            // Writer task already gone; the close handler will unregister.
            warn!(guild = %guild_id, "agent instruction dropped: connection closing");
            return AgentSendOutcome::Dropped;
        }
        AgentSendOutcome::Sent
    }
}
