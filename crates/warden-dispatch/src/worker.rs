//! Per-tenant command worker.
//!
//! One worker task per active tenant consumes queue entries from an
//! unbounded channel. A single consumer gives both guarantees the queue
//! needs: strict enqueue-order dispatch and no concurrent drains.

use anyhow::{Context, Result};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::dispatch::{CommandDispatcher, QueueEntry};

pub struct CommandWorkerHandle {
    sender: Option<UnboundedSender<QueueEntry>>,
    task: Option<JoinHandle<()>>,
}

impl CommandWorkerHandle {
    /// Non-blocking enqueue; returns false once the worker has stopped.
    pub fn enqueue(&self, entry: QueueEntry) -> bool {
        match &self.sender {
            Some(sender) => sender.send(entry).is_ok(),
            None => false,
        }
    }

    /// A clone of the queue's sending half, for producers that outlive this
    /// handle's borrow. `None` once the worker has stopped.
    pub fn sender(&self) -> Option<UnboundedSender<QueueEntry>> {
        self.sender.clone()
    }

    /// Closes the queue. The worker drains whatever is already enqueued and
    /// then exits; the returned handle resolves when it does.
    pub fn stop(mut self) -> Option<JoinHandle<()>> {
        self.sender = None;
        self.task.take()
    }
}

impl Drop for CommandWorkerHandle {
    fn drop(&mut self) {
        // Dropping the sender ends the worker loop after the backlog drains.
        self.sender = None;
    }
}

/// Starts the single consumer loop for a tenant. Requires a running Tokio
/// runtime; started at tenant activation, stopped at deactivation.
pub fn start_command_worker(dispatcher: CommandDispatcher) -> Result<CommandWorkerHandle> {
    let runtime =
        tokio::runtime::Handle::try_current().context("command worker requires a Tokio runtime")?;
    let (sender, mut receiver) = mpsc::unbounded_channel::<QueueEntry>();
    let task = runtime.spawn(async move {
        while let Some(entry) = receiver.recv().await {
            debug!(
                guild = %dispatcher.guild_id(),
                command = %entry.command_name,
                player = %entry.player_id,
                "dispatching queued command"
            );
            dispatcher.process(entry).await;
        }
    });
    Ok(CommandWorkerHandle {
        sender: Some(sender),
        task: Some(task),
    })
}
