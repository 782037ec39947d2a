//! PostgreSQL schema for the destination table.

use sqlx::PgConnection;

use crate::error::StorageError;

/// Create the `universities` table and its lookup index if missing.
///
/// The natural key index is not unique; the sync session upholds uniqueness
/// with check-then-insert.
pub async fn ensure_schema(conn: &mut PgConnection) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS universities (
            id SERIAL PRIMARY KEY,
            alpha_two_code VARCHAR(2),
            country VARCHAR(255),
            name VARCHAR(255),
            state_province VARCHAR(255),
            type VARCHAR(255),
            created_at TIMESTAMP WITH TIME ZONE
        )
        "#,
    )
    .execute(&mut *conn)
    .await
    .map_err(|e| schema_error("create table universities", e))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_universities_natural_key
         ON universities (name, alpha_two_code)",
    )
    .execute(&mut *conn)
    .await
    .map_err(|e| schema_error("create natural key index", e))?;

    Ok(())
}

// Keep transport failures classified as connection errors.
fn schema_error(context: &str, err: sqlx::Error) -> StorageError {
    match StorageError::from(err) {
        StorageError::Database(e) => StorageError::Schema(format!("{context}: {e}")),
        other => other,
    }
}
