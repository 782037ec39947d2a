//! Dedup store traits.
//!
//! A [`SyncStore`] hands out one [`SyncSession`] per run. The session owns a
//! single connection and transaction; everything it inserts becomes visible
//! to other sessions only after [`SyncSession::commit`]. Dropping a session
//! without committing rolls it back and returns the connection.

use async_trait::async_trait;
use unisync_core::{NaturalKey, NewInstitution};

use crate::error::StorageError;

#[async_trait]
pub trait SyncStore: Send + Sync {
    /// Acquire a connection and open a transaction.
    ///
    /// # Errors
    /// Any failure here is reported as [`StorageError::Connection`].
    async fn begin(&self) -> Result<Box<dyn SyncSession>, StorageError>;

    /// Committed rows in the destination table; 0 if the table does not exist yet.
    async fn count_rows(&self) -> Result<i64, StorageError>;
}

#[async_trait]
pub trait SyncSession: Send {
    /// Create the destination table if absent. Safe to call on every run.
    async fn ensure_schema(&mut self) -> Result<(), StorageError>;

    /// Whether a row with this natural key exists, including rows inserted
    /// earlier in this session.
    async fn exists(&mut self, key: NaturalKey<'_>) -> Result<bool, StorageError>;

    /// Append a row and return its surrogate id.
    async fn insert(&mut self, row: &NewInstitution) -> Result<i32, StorageError>;

    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}
