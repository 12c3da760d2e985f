//! Agent websocket session lifecycle against a real listener socket.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use warden_agent::{run_agent_listener, AgentInstruction, AgentRegistry, AgentSessionEvent};
use warden_core::GuildId;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn next_event(
    events: &mut mpsc::UnboundedReceiver<AgentSessionEvent>,
) -> AgentSessionEvent {
    timeout(RECV_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("event channel closed")
}

fn status_update(guild: &str, online: bool) -> Message {
    Message::text(format!(
        r#"{{
            "action": "statusUpdate",
            "guild_id": "{guild}",
            "ftp_server_data": {{
                "ftp_server_host": "logs.example.net",
                "ftp_server_port": 21,
                "ftp_server_user": "tenant",
                "ftp_server_password": "secret"
            }},
            "connectedToServer": true,
            "serverOnline": {online},
            "localTime": "05:40"
        }}"#
    ))
}

#[tokio::test]
async fn status_updates_drive_session_events_and_outbound_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let registry = AgentRegistry::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let server = tokio::spawn(run_agent_listener(listener, registry.clone(), events_tx));

    let (mut agent, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("agent connects");

    // An online status update activates the tenant.
    agent
        .send(status_update("guild-1", true))
        .await
        .expect("send status");
    match next_event(&mut events).await {
        AgentSessionEvent::Activated {
            guild_id,
            ftp_server_data,
            local_time,
        } => {
            assert_eq!(guild_id, GuildId::new("guild-1"));
            let ftp = ftp_server_data.expect("credentials");
            assert_eq!(ftp.ftp_server_host, "logs.example.net");
            assert_eq!(local_time.as_deref(), Some("05:40"));
        }
        other => panic!("expected activation, got {other:?}"),
    }
    assert!(registry.is_connected(&GuildId::new("guild-1")));

    // Outbound instructions reach the connected agent as JSON frames.
    registry.send(AgentInstruction::AnnounceMessage {
        guild_id: GuildId::new("guild-1"),
        message: "Server restart in 5 minutes".to_string(),
    });
    let frame = timeout(RECV_TIMEOUT, agent.next())
        .await
        .expect("timed out waiting for outbound frame")
        .expect("socket open")
        .expect("read frame");
    let payload: Value =
        serde_json::from_str(frame.to_text().expect("text frame")).expect("frame JSON");
    assert_eq!(payload["action"], "announceMessage");
    assert_eq!(payload["message"], "Server restart in 5 minutes");

    // An offline report deactivates without closing the socket.
    agent
        .send(status_update("guild-1", false))
        .await
        .expect("send status");
    assert_eq!(
        next_event(&mut events).await,
        AgentSessionEvent::Deactivated {
            guild_id: GuildId::new("guild-1")
        }
    );
    assert!(registry.is_connected(&GuildId::new("guild-1")));

    // Closing the socket tears the binding down.
    agent.close(None).await.expect("close");
    assert_eq!(
        next_event(&mut events).await,
        AgentSessionEvent::Deactivated {
            guild_id: GuildId::new("guild-1")
        }
    );
    assert!(!registry.is_connected(&GuildId::new("guild-1")));

    server.abort();
}

#[tokio::test]
async fn a_bound_connection_only_speaks_for_its_own_guild() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let registry = AgentRegistry::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let server = tokio::spawn(run_agent_listener(listener, registry.clone(), events_tx));

    let (mut agent, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("agent connects");

    agent
        .send(status_update("guild-1", true))
        .await
        .expect("send status");
    match next_event(&mut events).await {
        AgentSessionEvent::Activated { guild_id, .. } => {
            assert_eq!(guild_id, GuildId::new("guild-1"));
        }
        other => panic!("expected activation, got {other:?}"),
    }

    // A frame claiming another guild on the same socket must not produce
    // events or a registry mapping for that guild.
    agent
        .send(status_update("guild-2", true))
        .await
        .expect("send foreign status");
    agent
        .send(status_update("guild-1", false))
        .await
        .expect("send status");
    assert_eq!(
        next_event(&mut events).await,
        AgentSessionEvent::Deactivated {
            guild_id: GuildId::new("guild-1")
        }
    );
    assert!(!registry.is_connected(&GuildId::new("guild-2")));

    // Close teardown concerns only the bound guild.
    agent.close(None).await.expect("close");
    assert_eq!(
        next_event(&mut events).await,
        AgentSessionEvent::Deactivated {
            guild_id: GuildId::new("guild-1")
        }
    );
    assert!(events.try_recv().is_err());

    server.abort();
}

#[tokio::test]
async fn malformed_frames_are_ignored_and_the_session_survives() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let registry = AgentRegistry::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let server = tokio::spawn(run_agent_listener(listener, registry.clone(), events_tx));

    let (mut agent, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("agent connects");

    agent
        .send(Message::text("not json at all"))
        .await
        .expect("send garbage");
    agent
        .send(Message::text(r#"{"action":"pressEnter"}"#))
        .await
        .expect("send unknown action");
    agent
        .send(status_update("guild-2", true))
        .await
        .expect("send status");

    // Only the valid frame produces an event.
    match next_event(&mut events).await {
        AgentSessionEvent::Activated { guild_id, .. } => {
            assert_eq!(guild_id, GuildId::new("guild-2"));
        }
        other => panic!("expected activation, got {other:?}"),
    }

    server.abort();
}
