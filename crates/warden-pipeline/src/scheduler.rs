//! Interval-driven tenant loops.
//!
//! Each active tenant runs three loops: one fetch/extract cycle per stream
//! on its own interval, and a once-a-minute restart-announcement check. All
//! three shut down through oneshot channels when the tenant deactivates.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use warden_agent::{AgentInstruction, AgentRegistry};
use warden_core::GuildId;

use crate::cursor::StreamKind;
use crate::pipeline::TenantPipeline;
use crate::restart::restart_announcement;

/// How often each tenant loop fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineIntervals {
    pub login: Duration,
    pub chat: Duration,
    pub restart_check: Duration,
}

impl Default for PipelineIntervals {
    fn default() -> Self {
        Self {
            login: Duration::from_secs(20),
            chat: Duration::from_secs(20),
            restart_check: Duration::from_secs(60),
        }
    }
}

pub struct TenantSchedulerHandle {
    guild_id: GuildId,
    shutdown_txs: Vec<oneshot::Sender<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl TenantSchedulerHandle {
    pub fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub async fn shutdown(&mut self) {
        for shutdown_tx in self.shutdown_txs.drain(..) {
            let _ = shutdown_tx.send(());
        }
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }
}

/// Spawns the tenant's stream and restart loops. The pipeline is shared by
/// reference; cycles for different streams may overlap, cycles for the same
/// stream serialize on the stream's cursor lock.
pub fn start_tenant_scheduler(
    pipeline: Arc<TenantPipeline>,
    agents: AgentRegistry,
    intervals: PipelineIntervals,
) -> TenantSchedulerHandle {
    let guild_id = pipeline.guild_id().clone();
    let mut shutdown_txs = Vec::new();
    let mut tasks = Vec::new();

    for kind in [StreamKind::Login, StreamKind::Chat] {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let interval = match kind {
            StreamKind::Login => intervals.login,
            StreamKind::Chat => intervals.chat,
        };
        let stream_pipeline = pipeline.clone();
        shutdown_txs.push(shutdown_tx);
        tasks.push(tokio::spawn(async move {
            run_stream_loop(stream_pipeline, kind, interval, shutdown_rx).await;
        }));
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let restart_guild = guild_id.clone();
    shutdown_txs.push(shutdown_tx);
    tasks.push(tokio::spawn(async move {
        run_restart_loop(
            restart_guild,
            agents,
            intervals.restart_check,
            shutdown_rx,
            || {
                let now = Local::now();
                (now.hour(), now.minute())
            },
        )
        .await;
    }));

    info!(guild = %guild_id, "tenant scheduler started");
    TenantSchedulerHandle {
        guild_id,
        shutdown_txs,
        tasks,
    }
}

async fn run_stream_loop(
    pipeline: Arc<TenantPipeline>,
    kind: StreamKind,
    interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                pipeline.run_cycle(kind).await;
            }
            _ = &mut shutdown_rx => {
                info!(guild = %pipeline.guild_id(), stream = kind.as_str(), "stream loop stopped");
                return;
            }
        }
    }
}

async fn run_restart_loop<C>(
    guild_id: GuildId,
    agents: AgentRegistry,
    interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
    clock: C,
) where
    C: Fn() -> (u32, u32) + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // Guards against a double announcement when two ticks land in the same
    // wall-clock minute.
    let mut last_announced: Option<(u32, u32)> = None;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (hour, minute) = clock();
                if last_announced == Some((hour, minute)) {
                    continue;
                }
                if let Some(message) = restart_announcement(hour, minute) {
                    last_announced = Some((hour, minute));
                    agents.send(AgentInstruction::AnnounceMessage {
                        guild_id: guild_id.clone(),
                        message: message.to_string(),
                    });
                }
            }
            _ = &mut shutdown_rx => {
                return;
            }
        }
    }
}
