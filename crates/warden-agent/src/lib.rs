//! Agent control protocol and connection registry.
//!
//! Each tenant runs a remote agent process next to the game client. The
//! agent holds one persistent websocket connection to the daemon: inbound
//! `statusUpdate` frames activate or deactivate the tenant's pipelines,
//! outbound frames carry command executions, teleports, and announcements.
//! Outbound delivery is strictly best-effort; nothing is buffered for an
//! agent that is not connected.

pub mod listener;
pub mod protocol;
pub mod registry;

pub use listener::{run_agent_listener, AgentSessionEvent};
pub use protocol::{
    parse_agent_inbound_frame, AgentInboundFrame, AgentInstruction, FtpServerData,
    AGENT_ACTION_ANNOUNCE_MESSAGE, AGENT_ACTION_RUN_COMMAND, AGENT_ACTION_STATUS_UPDATE,
    AGENT_ACTION_TELEPORT,
};
pub use registry::{AgentRegistry, AgentSendOutcome};
