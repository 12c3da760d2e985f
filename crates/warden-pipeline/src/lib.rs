//! Per-tenant log pipelines.
//!
//! A tenant pipeline runs one fetch/extract/route cycle per stream on a
//! fixed interval: fetch the newest remote file, diff against the stored
//! cursor, extract events from new lines, fan out to the session ledger,
//! command queue, and notification sinks, then advance the cursor.

pub mod cursor;
pub mod notify;
pub mod pipeline;
pub mod restart;
pub mod scheduler;
pub mod tenant;

pub use cursor::{plan_cycle, Cursor, CyclePlan, StreamKind};
pub use notify::NotificationSink;
pub use pipeline::{CycleReport, PipelineConfig, TenantPipeline};
pub use restart::restart_announcement;
pub use scheduler::{start_tenant_scheduler, PipelineIntervals, TenantSchedulerHandle};
pub use tenant::{TenantRegistry, TenantSettings};
