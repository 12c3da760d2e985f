//! JSON frame types for the agent control protocol.
//!
//! Frames are single JSON objects discriminated by an `action` field. Field
//! spelling follows the wire protocol the agent already speaks, which mixes
//! snake_case and camelCase.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use warden_core::GuildId;

pub const AGENT_ACTION_STATUS_UPDATE: &str = "statusUpdate";
pub const AGENT_ACTION_RUN_COMMAND: &str = "runCommand";
pub const AGENT_ACTION_TELEPORT: &str = "teleport";
pub const AGENT_ACTION_ANNOUNCE_MESSAGE: &str = "announceMessage";

/// FTP credentials for the tenant's log host, carried inside a
/// `statusUpdate` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtpServerData {
    pub ftp_server_host: String,
    pub ftp_server_port: u16,
    pub ftp_server_user: String,
    pub ftp_server_password: String,
}

/// Inbound frames from a connected agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum AgentInboundFrame {
    #[serde(rename = "statusUpdate")]
    StatusUpdate {
        guild_id: GuildId,
        #[serde(default)]
        ftp_server_data: Option<FtpServerData>,
        #[serde(rename = "connectedToServer", default)]
        connected_to_server: bool,
        #[serde(rename = "serverOnline", default)]
        server_online: bool,
        #[serde(rename = "localTime", default)]
        local_time: Option<String>,
    },
}

impl AgentInboundFrame {
    pub fn guild_id(&self) -> &GuildId {
        match self {
            Self::StatusUpdate { guild_id, .. } => guild_id,
        }
    }

    /// True when the agent reports both a live game-client connection and an
    /// online game server; anything less deactivates the tenant.
    pub fn signals_active(&self) -> bool {
        match self {
            Self::StatusUpdate {
                connected_to_server,
                server_online,
                ..
            } => *connected_to_server && *server_online,
        }
    }
}

/// Outbound instructions to a connected agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum AgentInstruction {
    #[serde(rename = "runCommand")]
    RunCommand {
        guild_id: GuildId,
        package_items: Vec<String>,
        player_id: String,
    },
    #[serde(rename = "teleport")]
    Teleport {
        guild_id: GuildId,
        x: f64,
        y: f64,
        z: f64,
        player_id: String,
    },
    #[serde(rename = "announceMessage")]
    AnnounceMessage { guild_id: GuildId, message: String },
}

impl AgentInstruction {
    pub fn guild_id(&self) -> &GuildId {
        match self {
            Self::RunCommand { guild_id, .. }
            | Self::Teleport { guild_id, .. }
            | Self::AnnounceMessage { guild_id, .. } => guild_id,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::RunCommand { .. } => AGENT_ACTION_RUN_COMMAND,
            Self::Teleport { .. } => AGENT_ACTION_TELEPORT,
            Self::AnnounceMessage { .. } => AGENT_ACTION_ANNOUNCE_MESSAGE,
        }
    }

    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to encode agent instruction frame")
    }
}

pub fn parse_agent_inbound_frame(raw: &str) -> Result<AgentInboundFrame> {
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .context("failed to parse agent frame JSON")?;
    let Some(action) = value.get("action").and_then(|action| action.as_str()) else {
        bail!("agent frame is missing the 'action' field");
    };
    if action != AGENT_ACTION_STATUS_UPDATE {
        bail!("unsupported agent frame action '{action}'; supported actions are statusUpdate");
    }
    let frame = serde_json::from_value::<AgentInboundFrame>(value)
        .context("malformed statusUpdate frame")?;
    if frame.guild_id().as_str().trim().is_empty() {
        bail!("statusUpdate frame guild_id must be non-empty");
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_activating_status_update() {
        let raw = r#"{
            "action": "statusUpdate",
            "guild_id": "guild-1",
            "ftp_server_data": {
                "ftp_server_host": "logs.example.net",
                "ftp_server_port": 21,
                "ftp_server_user": "tenant",
                "ftp_server_password": "secret"
            },
            "connectedToServer": true,
            "serverOnline": true,
            "localTime": "05:40"
        }"#;
        let frame = parse_agent_inbound_frame(raw).expect("frame");
        assert_eq!(frame.guild_id().as_str(), "guild-1");
        assert!(frame.signals_active());
    }

    #[test]
    fn status_update_with_offline_server_deactivates() {
        let raw = r#"{"action":"statusUpdate","guild_id":"g","connectedToServer":true,"serverOnline":false}"#;
        let frame = parse_agent_inbound_frame(raw).expect("frame");
        assert!(!frame.signals_active());
    }

    #[test]
    fn rejects_unknown_action_and_missing_guild() {
        assert!(parse_agent_inbound_frame(r#"{"action":"pressEnter"}"#).is_err());
        assert!(parse_agent_inbound_frame(r#"{"guild_id":"g"}"#).is_err());
        assert!(
            parse_agent_inbound_frame(r#"{"action":"statusUpdate","guild_id":"  "}"#).is_err()
        );
        assert!(parse_agent_inbound_frame("not json").is_err());
    }

    #[test]
    fn instruction_frames_carry_wire_action_names() {
        let guild = GuildId::new("g");
        let encoded = AgentInstruction::AnnounceMessage {
            guild_id: guild.clone(),
            message: "Server restart in 5 minutes".to_string(),
        }
        .encode()
        .expect("encode");
        let value: serde_json::Value = serde_json::from_str(&encoded).expect("json");
        assert_eq!(value["action"], "announceMessage");

        let encoded = AgentInstruction::Teleport {
            guild_id: guild,
            x: 1.0,
            y: 2.0,
            z: 3.0,
            player_id: "76561198000000001".to_string(),
        }
        .encode()
        .expect("encode");
        let value: serde_json::Value = serde_json::from_str(&encoded).expect("json");
        assert_eq!(value["action"], "teleport");
        assert_eq!(value["player_id"], "76561198000000001");
    }
}
