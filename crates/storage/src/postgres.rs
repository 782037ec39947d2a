//! PostgreSQL dedup store using sqlx.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use unisync_core::{
    NaturalKey, NewInstitution, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS,
    PG_POOL_MAX_CONNECTIONS,
};

use crate::error::StorageError;
use crate::schema::ensure_schema;
use crate::store::{SyncSession, SyncStore};

/// SQLSTATE for "relation does not exist".
const UNDEFINED_TABLE: &str = "42P01";

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Build a lazily connecting pool. No I/O happens until the first
    /// [`SyncStore::begin`], so an unreachable server surfaces inside a run
    /// as a connection error instead of at startup.
    ///
    /// # Errors
    /// Returns [`StorageError::Connection`] if the URL cannot be parsed.
    pub fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect_lazy(database_url)
            .map_err(StorageError::Connection)?;
        Ok(Self { pool })
    }

    /// Close every pooled connection; used on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SyncStore for PgStorage {
    async fn begin(&self) -> Result<Box<dyn SyncSession>, StorageError> {
        let tx = self.pool.begin().await.map_err(StorageError::Connection)?;
        tracing::debug!("database transaction opened");
        Ok(Box::new(PgSyncSession { tx }))
    }

    async fn count_rows(&self) -> Result<i64, StorageError> {
        match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM universities")
            .fetch_one(&self.pool)
            .await
        {
            Ok(count) => Ok(count),
            Err(sqlx::Error::Database(ref db_err))
                if db_err.code().as_deref() == Some(UNDEFINED_TABLE) =>
            {
                Ok(0)
            },
            Err(e) => Err(e.into()),
        }
    }
}

/// One run's transaction. Dropping it without commit rolls back.
pub struct PgSyncSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SyncSession for PgSyncSession {
    async fn ensure_schema(&mut self) -> Result<(), StorageError> {
        ensure_schema(&mut self.tx).await
    }

    async fn exists(&mut self, key: NaturalKey<'_>) -> Result<bool, StorageError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM universities WHERE name = $1 AND alpha_two_code = $2
             )",
        )
        .bind(key.name)
        .bind(key.alpha_two_code)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(found)
    }

    async fn insert(&mut self, row: &NewInstitution) -> Result<i32, StorageError> {
        let id: i32 = sqlx::query_scalar(
            r#"INSERT INTO universities
               (alpha_two_code, country, name, state_province, type, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(&row.alpha_two_code)
        .bind(&row.country)
        .bind(&row.name)
        .bind(&row.state_province)
        .bind(row.institution_type.map(|t| t.as_str()))
        .bind(row.created_at)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
