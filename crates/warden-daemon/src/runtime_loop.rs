//! Daemon runtime: agent listener plus the tenant lifecycle loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use warden_agent::{run_agent_listener, AgentRegistry, AgentSessionEvent};
use warden_pipeline::TenantRegistry;

use crate::account_store_file::JsonFileAccountStore;
use crate::daemon_config::DaemonConfig;
use crate::notification_log::TracingNotificationSink;
use crate::package_store_static::StaticPackageStore;

pub async fn run_daemon(config: DaemonConfig) -> Result<()> {
    let agents = AgentRegistry::new();
    let accounts = Arc::new(JsonFileAccountStore::load(&config.accounts_path)?);
    let packages = Arc::new(StaticPackageStore::new(config.packages.clone()));
    let tenants = Arc::new(TenantRegistry::new(
        config.tenant_settings()?,
        accounts,
        packages,
        Arc::new(TracingNotificationSink),
        agents.clone(),
    ));

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind agent listener on {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "agent listener bound");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let listener_task = tokio::spawn(run_agent_listener(listener, agents, events_tx));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            event = events_rx.recv() => {
                let Some(event) = event else {
                    warn!("agent listener stopped producing events");
                    break;
                };
                handle_session_event(&tenants, event).await;
            }
        }
    }

    listener_task.abort();
    tenants.deactivate_all().await;
    info!("daemon stopped");
    Ok(())
}

async fn handle_session_event(tenants: &TenantRegistry, event: AgentSessionEvent) {
    match event {
        AgentSessionEvent::Activated {
            guild_id,
            ftp_server_data,
            local_time,
        } => {
            if !tenants.is_configured(&guild_id) {
                warn!(guild = %guild_id, "status update for an unconfigured tenant; ignoring");
                return;
            }
            // Agents repeat statusUpdate on a heartbeat; a tenant that is
            // already running stays as it is.
            if tenants.is_active(&guild_id).await {
                return;
            }
            let Some(ftp) = ftp_server_data else {
                warn!(guild = %guild_id, "status update without log-host credentials; cannot activate");
                return;
            };
            info!(guild = %guild_id, local_time = ?local_time, "activating tenant");
            if let Err(error) = tenants.activate(&guild_id, &ftp).await {
                warn!(guild = %guild_id, %error, "tenant activation failed");
            }
        }
        AgentSessionEvent::Deactivated { guild_id } => {
            tenants.deactivate(&guild_id).await;
        }
    }
}
