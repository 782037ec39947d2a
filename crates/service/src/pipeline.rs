//! The sync pipeline driver.
//!
//! One call to [`SyncPipeline::run`] is one run: fetch the payload, open a
//! session, ensure the table, insert every record whose natural key is
//! absent, commit once. Failures never escape; they end the run in
//! [`RunState::Aborted`] and are described by the returned [`RunReport`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use serde::Serialize;
use tracing::Instrument;
use unisync_core::{InstitutionRecord, NewInstitution};
use unisync_source::InstitutionSource;
use unisync_storage::{SyncSession, SyncStore};
use uuid::Uuid;

use crate::error::{FailureKind, SyncError};
use crate::notifier::Notifier;

/// Driver states. A run only moves forward; `Aborted` is reachable from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Start,
    Fetching,
    SchemaReady,
    Processing,
    Committed,
    Done,
    Aborted,
}

impl RunState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunFailure {
    pub kind: FailureKind,
    pub message: String,
    /// State the run was in when it failed. `None` when the scheduler cut the
    /// run off at its timeout, since the dropped run leaves no state behind.
    pub during: Option<RunState>,
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Every state visited, in order, starting with `Start`.
    pub states: Vec<RunState>,
    pub fetched: usize,
    /// Names of newly inserted institutions. Empty unless committed.
    pub inserted: Vec<String>,
    /// Records whose natural key was already present.
    pub skipped: usize,
    /// Inserts discarded by rollback.
    pub rolled_back: usize,
    pub committed: bool,
    pub failure: Option<RunFailure>,
    /// Whether the failure notification went out.
    pub notified: bool,
}

impl RunReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            states: vec![RunState::Start],
            fetched: 0,
            inserted: Vec::new(),
            skipped: 0,
            rolled_back: 0,
            committed: false,
            failure: None,
            notified: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Start)
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state() == RunState::Done
    }

    fn enter(&mut self, state: RunState) {
        tracing::debug!(from = ?self.state(), to = ?state, "run state transition");
        self.states.push(state);
    }
}

pub struct SyncPipeline {
    source: Arc<dyn InstitutionSource>,
    store: Arc<dyn SyncStore>,
    notifier: Arc<dyn Notifier>,
}

impl SyncPipeline {
    pub fn new(
        source: Arc<dyn InstitutionSource>,
        store: Arc<dyn SyncStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { source, store, notifier }
    }

    /// Execute one run inside its own `sync_run` span.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync_run", %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> RunReport {
        tracing::info!("starting institution sync");
        let mut report = RunReport::new(run_id);

        let outcome = AssertUnwindSafe(self.execute(&mut report)).catch_unwind().await;
        let result = outcome.unwrap_or_else(|panic| Err(SyncError::Panic(panic_message(&*panic))));

        match result {
            Ok(()) => {
                report.enter(RunState::Done);
                tracing::info!(
                    fetched = report.fetched,
                    inserted = report.inserted.len(),
                    skipped = report.skipped,
                    "institution sync finished"
                );
            },
            Err(err) => self.abort(&mut report, &err).await,
        }
        report.finished_at = Utc::now();
        report
    }

    async fn execute(&self, report: &mut RunReport) -> Result<(), SyncError> {
        report.enter(RunState::Fetching);
        let records = self.source.fetch().await?;
        report.fetched = records.len();
        if records.is_empty() {
            tracing::info!("source returned no records, nothing to do");
            return Ok(());
        }

        let mut session = self.store.begin().await?;
        match load(session.as_mut(), &records, report).await {
            Ok(()) => {
                session.commit().await?;
                report.committed = true;
                report.enter(RunState::Committed);
                Ok(())
            },
            Err(err) => {
                if let Err(rollback_err) = session.rollback().await {
                    // Connection is still released when the session drops.
                    tracing::warn!(error = %rollback_err, "explicit rollback failed");
                }
                Err(err)
            },
        }
    }

    async fn abort(&self, report: &mut RunReport, err: &SyncError) {
        let during = report.state();
        report.rolled_back = report.inserted.len();
        report.inserted.clear();
        report.enter(RunState::Aborted);
        report.failure = Some(RunFailure {
            kind: err.kind(),
            message: err.to_string(),
            during: Some(during),
        });

        if err.is_expected() {
            tracing::error!(kind = %err.kind(), state = ?during, error = %err, "sync run aborted");
            return;
        }

        tracing::error!(state = ?during, error = %err, "unexpected failure in sync run");
        match self.notifier.notify_failure(&err.to_string()).await {
            Ok(()) => report.notified = true,
            Err(notify_err) => {
                tracing::error!(error = %notify_err, "failed to send failure notification");
            },
        }
    }
}

/// Ensure the table, then upsert-by-absence every record in input order.
async fn load(
    session: &mut dyn SyncSession,
    records: &[InstitutionRecord],
    report: &mut RunReport,
) -> Result<(), SyncError> {
    session.ensure_schema().await?;
    report.enter(RunState::SchemaReady);

    report.enter(RunState::Processing);
    for record in records {
        let key = record.natural_key();
        if session.exists(key).await? {
            tracing::debug!(%key, "institution already present, skipping");
            report.skipped += 1;
            continue;
        }
        let row = NewInstitution::from_record(record, Utc::now());
        let id = session.insert(&row).await?;
        tracing::info!(
            id,
            name = %row.name,
            institution_type = row.institution_type.map_or("none", |t| t.as_str()),
            "added new institution"
        );
        report.inserted.push(row.name);
    }
    Ok(())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
