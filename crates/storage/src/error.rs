//! Typed error enum for the storage layer.
//!
//! Separates "could not reach the database" from "the database rejected a
//! statement" so the pipeline can treat the first as an expected operational
//! failure and the second as a defect.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection could not be established or was lost.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// SQL failure on an established connection.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Table creation failed.
    #[error("schema error: {0}")]
    Schema(String),
}

impl StorageError {
    /// Whether the database was unreachable rather than misbehaving.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Custom `From<sqlx::Error>` instead of a blanket `#[from]`.
///
/// - I/O, TLS, pool exhaustion, closed pool, bad URL → `Connection`
/// - Everything else → `Database`
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => Self::Connection(err),
            _ => Self::Database(err),
        }
    }
}
