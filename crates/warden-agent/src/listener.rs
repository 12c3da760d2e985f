//! Websocket listener for inbound agent connections.
//!
//! One task per connection reads frames and forwards session events to the
//! daemon; a paired writer task drains the tenant's outbound instruction
//! channel into the socket. The guild binding is established by the first
//! `statusUpdate` frame and torn down when the socket closes.

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use warden_core::GuildId;

use crate::protocol::{parse_agent_inbound_frame, AgentInboundFrame, FtpServerData};
use crate::registry::AgentRegistry;

/// Tenant lifecycle notifications produced by agent sessions.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentSessionEvent {
    Activated {
        guild_id: GuildId,
        ftp_server_data: Option<FtpServerData>,
        local_time: Option<String>,
    },
    Deactivated {
        guild_id: GuildId,
    },
}

/// Accept loop; runs until the listener socket fails.
pub async fn run_agent_listener(
    listener: TcpListener,
    registry: AgentRegistry,
    events: UnboundedSender<AgentSessionEvent>,
) -> Result<()> {
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .context("agent listener accept failed")?;
        debug!(%peer, "agent connection accepted");
        let registry = registry.clone();
        let events = events.clone();
        tokio::spawn(async move {
            if let Err(error) = handle_agent_connection(stream, registry, events).await {
                warn!(%peer, %error, "agent connection ended with an error");
            }
        });
    }
}

async fn handle_agent_connection(
    stream: TcpStream,
    registry: AgentRegistry,
    events: UnboundedSender<AgentSessionEvent>,
) -> Result<()> {
    let websocket = tokio_tungstenite::accept_async(stream)
        .await
        .context("websocket handshake failed")?;
    let (mut sink, mut source) = websocket.split();

    let (instruction_tx, mut instruction_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(async move {
        while let Some(instruction) = instruction_rx.recv().await {
            let encoded = match crate::protocol::AgentInstruction::encode(&instruction) {
                Ok(encoded) => encoded,
                Err(error) => {
                    warn!(%error, "failed to encode agent instruction; skipping");
                    continue;
                }
            };
            if sink.send(Message::text(encoded)).await.is_err() {
                break;
            }
        }
    });

    let mut bound_guild: Option<GuildId> = None;
    while let Some(message) = source.next().await {
        let message = match message {
            Ok(message) => message,
            Err(error) => {
                warn!(%error, "agent websocket read failed");
                break;
            }
        };
        let raw = match message {
            Message::Text(raw) => raw,
            Message::Close(_) => break,
            // Pings are answered by the protocol layer; everything else is
            // not part of the agent protocol.
            _ => continue,
        };

        let frame = match parse_agent_inbound_frame(raw.as_ref()) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, "ignoring malformed agent frame");
                continue;
            }
        };

        let AgentInboundFrame::StatusUpdate {
            guild_id,
            ftp_server_data,
            local_time,
            ..
        } = frame.clone();

        // One connection speaks for exactly one tenant. Frames claiming a
        // different guild after binding are not trusted; forwarding them
        // would activate a tenant this socket can never serve.
        match &bound_guild {
            Some(bound) if *bound != guild_id => {
                warn!(
                    bound = %bound,
                    claimed = %guild_id,
                    "ignoring status update for a different guild on a bound connection"
                );
                continue;
            }
            Some(_) => {}
            None => {
                registry.register(guild_id.clone(), instruction_tx.clone());
                bound_guild = Some(guild_id.clone());
                info!(guild = %guild_id, "agent connection bound to tenant");
            }
        }

        let event = if frame.signals_active() {
            AgentSessionEvent::Activated {
                guild_id,
                ftp_server_data,
                local_time,
            }
        } else {
            AgentSessionEvent::Deactivated { guild_id }
        };
        if events.send(event).is_err() {
            break;
        }
    }

    if let Some(guild_id) = bound_guild {
        registry.unregister(&guild_id);
        let _ = events.send(AgentSessionEvent::Deactivated {
            guild_id: guild_id.clone(),
        });
        info!(guild = %guild_id, "agent connection closed");
    }
    writer.abort();
    Ok(())
}
