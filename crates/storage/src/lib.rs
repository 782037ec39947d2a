//! Storage layer for unisync
//!
//! The dedup store: per-run sessions that check institutions by natural key
//! and insert the missing ones inside a single PostgreSQL transaction.

mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
mod postgres;
mod schema;
mod store;

pub use error::StorageError;
pub use postgres::PgStorage;
pub use schema::ensure_schema;
pub use store::{SyncSession, SyncStore};
