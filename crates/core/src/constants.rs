//! Shared constants for unisync.
//!
//! Defaults for every tunable in [`SyncConfig`](crate::SyncConfig) live here
//! so the CLI help text and the config loader agree.

/// Destination table for synchronized institutions.
pub const UNIVERSITIES_TABLE: &str = "universities";

/// Source endpoint used when `UNISYNC_SOURCE_URL` is not set.
pub const DEFAULT_SOURCE_URL: &str = "http://127.0.0.1:5000/search";

/// Substring filter sent as `?name=`; the upstream job always asked for `Middle`.
pub const DEFAULT_NAME_FILTER: &str = "Middle";

/// Source HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Subject line of failure notifications.
pub const DEFAULT_NOTIFY_SUBJECT: &str = "Institution sync failure";

/// Scheduler: one run per day.
pub const DEFAULT_SCHEDULE_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Scheduler: retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Scheduler: pause between attempts in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5 * 60;

/// Scheduler: wall-clock budget for a single attempt in seconds.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 10 * 60;

/// PostgreSQL connection pool: maximum connections. A run holds one.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 2;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Maximum bytes of an HTTP body quoted in error messages.
pub const MAX_ERROR_BODY_LEN: usize = 500;
