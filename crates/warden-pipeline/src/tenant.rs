//! Tenant lifecycle: configured settings plus the running machinery.
//!
//! A tenant is configured once (marker, directory, teleport spots, spawn
//! area) and activated whenever its agent reports a live, online game
//! server with usable log-host credentials. Activation builds the remote
//! source, the command worker, the pipeline, and the scheduler; a
//! deactivation or a replacement status tears them down again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::Mutex;
use tracing::{info, warn};

use warden_agent::{AgentRegistry, FtpServerData};
use warden_core::GuildId;
use warden_dispatch::{
    start_command_worker, CommandDispatcher, CommandWorkerHandle, PackageStore,
};
use warden_extract::Coordinates;
use warden_ledger::AccountStore;
use warden_remote::{FtpLogSource, RemoteFileConfig};

use crate::notify::NotificationSink;
use crate::pipeline::{PipelineConfig, TenantPipeline};
use crate::scheduler::{start_tenant_scheduler, PipelineIntervals, TenantSchedulerHandle};

/// Static per-tenant configuration, loaded at startup.
#[derive(Debug, Clone)]
pub struct TenantSettings {
    /// Remote directory holding the rotated log files.
    pub log_directory: String,
    pub command_marker: char,
    pub spawn_coordinates: Option<Coordinates>,
    pub teleport_locations: HashMap<String, Coordinates>,
    pub intervals: PipelineIntervals,
    pub first_join_teleport_delay: Duration,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            log_directory: String::new(),
            command_marker: warden_extract::DEFAULT_COMMAND_MARKER,
            spawn_coordinates: None,
            teleport_locations: HashMap::new(),
            intervals: PipelineIntervals::default(),
            first_join_teleport_delay: Duration::from_secs(60),
        }
    }
}

struct ActiveTenant {
    scheduler: TenantSchedulerHandle,
    worker: CommandWorkerHandle,
}

/// Owns the configured tenants and their running instances.
pub struct TenantRegistry {
    settings: HashMap<GuildId, TenantSettings>,
    accounts: Arc<dyn AccountStore>,
    packages: Arc<dyn PackageStore>,
    sink: Arc<dyn NotificationSink>,
    agents: AgentRegistry,
    active: Mutex<HashMap<GuildId, ActiveTenant>>,
}

impl TenantRegistry {
    pub fn new(
        settings: HashMap<GuildId, TenantSettings>,
        accounts: Arc<dyn AccountStore>,
        packages: Arc<dyn PackageStore>,
        sink: Arc<dyn NotificationSink>,
        agents: AgentRegistry,
    ) -> Self {
        Self {
            settings,
            accounts,
            packages,
            sink,
            agents,
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_configured(&self, guild_id: &GuildId) -> bool {
        self.settings.contains_key(guild_id)
    }

    pub async fn is_active(&self, guild_id: &GuildId) -> bool {
        self.active.lock().await.contains_key(guild_id)
    }

    /// Brings a tenant's pipelines up with the credentials its agent just
    /// reported. An already-active tenant is rebuilt, since the credentials
    /// may have changed.
    pub async fn activate(&self, guild_id: &GuildId, ftp: &FtpServerData) -> Result<()> {
        let Some(settings) = self.settings.get(guild_id) else {
            bail!("no tenant configured for guild '{guild_id}'");
        };

        self.deactivate(guild_id).await;

        let source = Arc::new(FtpLogSource::new(RemoteFileConfig {
            host: ftp.ftp_server_host.clone(),
            port: ftp.ftp_server_port,
            username: ftp.ftp_server_user.clone(),
            password: ftp.ftp_server_password.clone(),
            directory: settings.log_directory.clone(),
        }));

        let dispatcher = CommandDispatcher::new(
            guild_id.clone(),
            self.accounts.clone(),
            self.packages.clone(),
            self.agents.clone(),
            settings.teleport_locations.clone(),
        );
        let worker = start_command_worker(dispatcher)?;
        let commands = worker
            .sender()
            .context("command worker stopped before activation finished")?;

        let pipeline = Arc::new(TenantPipeline::new(
            guild_id.clone(),
            PipelineConfig {
                command_marker: settings.command_marker,
                spawn_coordinates: settings.spawn_coordinates,
                first_join_teleport_delay: settings.first_join_teleport_delay,
            },
            source,
            self.accounts.clone(),
            self.sink.clone(),
            self.agents.clone(),
            commands,
        ));
        let scheduler =
            start_tenant_scheduler(pipeline, self.agents.clone(), settings.intervals.clone());

        let mut active = self.active.lock().await;
        active.insert(guild_id.clone(), ActiveTenant { scheduler, worker });
        info!(guild = %guild_id, "tenant activated");
        Ok(())
    }

    /// Stops a tenant's loops and drains its command queue. A no-op for
    /// tenants that are not active.
    pub async fn deactivate(&self, guild_id: &GuildId) {
        let removed = self.active.lock().await.remove(guild_id);
        let Some(mut tenant) = removed else {
            return;
        };
        tenant.scheduler.shutdown().await;
        if let Some(task) = tenant.worker.stop() {
            if let Err(error) = task.await {
                warn!(guild = %guild_id, %error, "command worker did not exit cleanly");
            }
        }
        info!(guild = %guild_id, "tenant deactivated");
    }

    /// Shuts down every active tenant. Called on daemon exit.
    pub async fn deactivate_all(&self) {
        let guild_ids: Vec<GuildId> = self.active.lock().await.keys().cloned().collect();
        for guild_id in guild_ids {
            self.deactivate(&guild_id).await;
        }
    }
}
