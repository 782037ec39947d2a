//! Typed error enum for the service layer.
//!
//! Unifies source, storage and runtime failures into a single error type and
//! sorts them into the operational taxonomy the driver acts on.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use unisync_source::SourceError;
use unisync_storage::StorageError;

/// Failure category of a run, as reported and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Parse,
    Connection,
    Unexpected,
    Timeout,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::Connection => "connection",
            Self::Unexpected => "unexpected",
            Self::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run ended early.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source unreachable or answered with an error status.
    #[error("error fetching data from API: {0}")]
    Fetch(#[source] SourceError),

    /// Source answered with something that is not a list of records.
    #[error("error decoding source payload: {0}")]
    Parse(#[source] SourceError),

    /// Database could not be reached.
    #[error("error connecting to database: {0}")]
    Connection(#[source] StorageError),

    /// Database reachable but a statement failed.
    #[error("storage failure: {0}")]
    Storage(#[source] StorageError),

    /// A component panicked mid-run.
    #[error("panic during run: {0}")]
    Panic(String),

    /// The scheduler gave up waiting for the run.
    #[error("run exceeded timeout of {}s", .0.as_secs())]
    Timeout(Duration),
}

impl SyncError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Fetch(_) => FailureKind::Fetch,
            Self::Parse(_) => FailureKind::Parse,
            Self::Connection(_) => FailureKind::Connection,
            Self::Storage(_) | Self::Panic(_) => FailureKind::Unexpected,
            Self::Timeout(_) => FailureKind::Timeout,
        }
    }

    /// Expected operational failures end the run quietly; the rest page a human.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        !matches!(self.kind(), FailureKind::Unexpected)
    }
}

impl From<SourceError> for SyncError {
    fn from(err: SourceError) -> Self {
        if err.is_parse() { Self::Parse(err) } else { Self::Fetch(err) }
    }
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        if err.is_connection() { Self::Connection(err) } else { Self::Storage(err) }
    }
}

/// Failures of the notification side channel. Logged, never propagated.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("notification relay answered {code}: {body}")]
    Rejected { code: u16, body: String },

    #[error("notifier initialization failed: {0}")]
    Init(String),
}
