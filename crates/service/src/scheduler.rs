//! In-process scheduler: periodic runs with retry, per-attempt timeout and a
//! failure callback. Runs never overlap.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};
use unisync_core::ScheduleConfig;

use crate::error::{FailureKind, SyncError};
use crate::notifier::Notifier;
use crate::pipeline::{RunFailure, RunReport, SyncPipeline};

/// Result of one scheduled slot: the first attempt plus any retries.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledRun {
    pub attempts: u32,
    pub succeeded: bool,
    /// Report of the last attempt that finished in time.
    pub last_report: Option<RunReport>,
    pub last_failure: Option<RunFailure>,
}

pub struct Scheduler {
    pipeline: Arc<SyncPipeline>,
    notifier: Arc<dyn Notifier>,
    config: ScheduleConfig,
}

impl Scheduler {
    pub fn new(
        pipeline: Arc<SyncPipeline>,
        notifier: Arc<dyn Notifier>,
        config: ScheduleConfig,
    ) -> Self {
        Self { pipeline, notifier, config }
    }

    /// Run once per interval until `shutdown` resolves. The first slot fires
    /// immediately; slots missed while a run is in progress are skipped.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            retries = self.config.retries,
            "scheduler started"
        );
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("scheduler stopping");
                    return;
                }
                _ = ticker.tick() => {
                    let slot = tokio::select! {
                        () = &mut shutdown => {
                            tracing::info!("scheduler stopping mid-run, current attempt abandoned");
                            return;
                        }
                        slot = self.run_slot() => slot,
                    };
                    let next = ticker.period().as_secs();
                    tracing::info!(
                        attempts = slot.attempts,
                        succeeded = slot.succeeded,
                        next_in_secs = next,
                        "scheduled slot finished"
                    );
                }
            }
        }
    }

    /// One slot: attempt, retry failed attempts after a delay, and raise the
    /// failure callback when every attempt failed.
    pub async fn run_slot(&self) -> ScheduledRun {
        let max_attempts = self.config.retries.saturating_add(1);
        let mut slot =
            ScheduledRun { attempts: 0, succeeded: false, last_report: None, last_failure: None };

        while slot.attempts < max_attempts {
            if slot.attempts > 0 {
                tracing::warn!(
                    attempt = slot.attempts + 1,
                    max_attempts,
                    delay_secs = self.config.retry_delay.as_secs(),
                    "retrying sync run"
                );
                tokio::time::sleep(self.config.retry_delay).await;
            }
            slot.attempts += 1;

            match self.attempt().await {
                Ok(report) if report.succeeded() => {
                    slot.succeeded = true;
                    slot.last_failure = None;
                    slot.last_report = Some(report);
                    return slot;
                },
                Ok(report) => {
                    slot.last_failure = report.failure.clone();
                    slot.last_report = Some(report);
                },
                Err(failure) => slot.last_failure = Some(failure),
            }
        }

        self.on_exhausted(&slot).await;
        slot
    }

    async fn attempt(&self) -> Result<RunReport, RunFailure> {
        let started = Instant::now();
        match tokio::time::timeout(self.config.run_timeout, self.pipeline.run()).await {
            Ok(report) => Ok(report),
            Err(_) => {
                let err = SyncError::Timeout(self.config.run_timeout);
                tracing::error!(
                    elapsed_secs = started.elapsed().as_secs(),
                    error = %err,
                    "sync run timed out, transaction abandoned"
                );
                Err(RunFailure {
                    kind: err.kind(),
                    message: err.to_string(),
                    during: None,
                })
            },
        }
    }

    async fn on_exhausted(&self, slot: &ScheduledRun) {
        let Some(failure) = &slot.last_failure else {
            return;
        };
        tracing::error!(
            attempts = slot.attempts,
            kind = %failure.kind,
            error = %failure.message,
            "sync failed on every attempt"
        );
        // The driver already alerted on unexpected failures.
        if failure.kind == FailureKind::Unexpected {
            return;
        }
        let message =
            format!("sync failed after {} attempt(s): {}", slot.attempts, failure.message);
        if let Err(e) = self.notifier.notify_failure(&message).await {
            tracing::error!(error = %e, "failed to send failure notification");
        }
    }
}
