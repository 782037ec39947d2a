//! Sync service for unisync
//!
//! Drives a run (fetch, classify, dedupe, insert, commit), alerts a human
//! on unexpected failures, and optionally schedules runs in-process.

mod error;
mod notifier;
mod pipeline;
mod scheduler;
#[cfg(test)]
mod test_support;

pub use error::{FailureKind, NotifyError, SyncError};
pub use notifier::{notifier_from_config, LogNotifier, Notifier, WebhookNotifier};
pub use pipeline::{RunFailure, RunReport, RunState, SyncPipeline};
pub use scheduler::{ScheduledRun, Scheduler};
