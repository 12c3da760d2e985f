//! Command queue and dispatch.
//!
//! Chat commands extracted by the pipeline are enqueued per tenant and
//! consumed by a single worker task, which preserves strict arrival order
//! and rules out concurrent drains without an explicit lock. Dispatch
//! resolves the command against the package store, applies balance checks
//! and debits, and pushes an execution instruction to the tenant's agent.

pub mod dispatch;
pub mod notice;
pub mod package;
pub mod worker;

pub use dispatch::{
    CommandDispatcher, QueueEntry, TELEPORT_COMMAND, WELCOME_KIT_COMMAND,
    WELCOME_KIT_COST_INCREMENT,
};
pub use notice::chat_display_name;
pub use package::{PackageDefinition, PackageStore};
pub use worker::{start_command_worker, CommandWorkerHandle};
