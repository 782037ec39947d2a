//! In-memory [`SyncStore`] for tests, with fault injection.
//!
//! Mirrors the transactional behavior of [`PgStorage`](crate::PgStorage):
//! inserts are staged per session, visible to that session's `exists`, and
//! published only on commit. Ids come from a counter that, like a SERIAL
//! sequence, is not rewound by rollback.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use unisync_core::{InstitutionRow, NaturalKey, NewInstitution};

use crate::error::StorageError;
use crate::store::{SyncSession, SyncStore};

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<InstitutionRow>,
    table_exists: bool,
    last_id: i32,
    open_sessions: usize,
    sessions_opened: usize,
    commits: usize,
    rollbacks: usize,
    refuse_connections: bool,
    fail_insert_of: Option<String>,
}

/// Shared handle; clones see the same rows, like a connection pool.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every `begin` fail as if the server were down.
    pub fn refuse_connections(&self, refuse: bool) {
        self.lock().refuse_connections = refuse;
    }

    /// Make inserting a row with this name fail with a database error.
    pub fn fail_insert_of(&self, name: impl Into<String>) {
        self.lock().fail_insert_of = Some(name.into());
    }

    pub fn clear_faults(&self) {
        let mut state = self.lock();
        state.refuse_connections = false;
        state.fail_insert_of = None;
    }

    /// Committed rows, in insertion order.
    #[must_use]
    pub fn rows(&self) -> Vec<InstitutionRow> {
        self.lock().rows.clone()
    }

    #[must_use]
    pub fn table_exists(&self) -> bool {
        self.lock().table_exists
    }

    /// Sessions begun and not yet committed, rolled back or dropped.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.lock().open_sessions
    }

    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    /// Explicit rollbacks plus sessions dropped without commit.
    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }
}

#[async_trait]
impl SyncStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn SyncSession>, StorageError> {
        let mut state = self.lock();
        if state.refuse_connections {
            let io =
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
            return Err(StorageError::Connection(sqlx::Error::Io(io)));
        }
        state.open_sessions += 1;
        state.sessions_opened += 1;
        Ok(Box::new(MemorySession {
            store: self.clone(),
            staged: Vec::new(),
            creates_table: false,
            finished: false,
        }))
    }

    async fn count_rows(&self) -> Result<i64, StorageError> {
        Ok(i64::try_from(self.lock().rows.len()).unwrap_or(i64::MAX))
    }
}

struct MemorySession {
    store: MemoryStore,
    staged: Vec<InstitutionRow>,
    creates_table: bool,
    finished: bool,
}

impl MemorySession {
    fn table_visible(&self) -> bool {
        self.creates_table || self.store.table_exists()
    }

    fn missing_table() -> StorageError {
        StorageError::Database(sqlx::Error::Protocol(
            "relation \"universities\" does not exist".to_owned(),
        ))
    }
}

#[async_trait]
impl SyncSession for MemorySession {
    async fn ensure_schema(&mut self) -> Result<(), StorageError> {
        self.creates_table = true;
        Ok(())
    }

    async fn exists(&mut self, key: NaturalKey<'_>) -> Result<bool, StorageError> {
        if !self.table_visible() {
            return Err(Self::missing_table());
        }
        let staged = self.staged.iter().any(|r| r.natural_key() == key);
        Ok(staged || self.store.lock().rows.iter().any(|r| r.natural_key() == key))
    }

    async fn insert(&mut self, row: &NewInstitution) -> Result<i32, StorageError> {
        if !self.table_visible() {
            return Err(Self::missing_table());
        }
        let id = {
            let mut state = self.store.lock();
            if state.fail_insert_of.as_deref() == Some(row.name.as_str()) {
                return Err(StorageError::Database(sqlx::Error::Protocol(format!(
                    "injected insert failure for {}",
                    row.name
                ))));
            }
            state.last_id += 1;
            state.last_id
        };
        self.staged.push(InstitutionRow::from_new(id, row.clone()));
        Ok(id)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        let mut state = self.store.lock();
        if self.creates_table {
            state.table_exists = true;
        }
        state.rows.append(&mut self.staged);
        state.commits += 1;
        drop(state);
        self.finished = true;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StorageError> {
        self.store.lock().rollbacks += 1;
        self.finished = true;
        Ok(())
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        let mut state = self.store.lock();
        state.open_sessions = state.open_sessions.saturating_sub(1);
        if !self.finished {
            state.rollbacks += 1;
        }
    }
}
