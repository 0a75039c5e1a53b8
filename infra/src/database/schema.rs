//! Table definitions for the verification stores
//!
//! Uniqueness lives in the schema: one challenge per handle (primary key)
//! and one verified record per email (primary key).

use sqlx::MySqlPool;
use tracing::info;

use crate::InfrastructureError;

pub const CREATE_CHALLENGES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS challenges (
        handle VARCHAR(128) NOT NULL,
        email VARCHAR(254) NOT NULL,
        code CHAR(6) NOT NULL,
        issued_at DATETIME(6) NOT NULL,
        expires_at DATETIME(6) NOT NULL,
        PRIMARY KEY (handle),
        INDEX idx_challenges_email (email),
        INDEX idx_challenges_expires_at (expires_at)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_bin
"#;

pub const CREATE_VERIFIED_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS verified (
        email VARCHAR(254) NOT NULL,
        handle VARCHAR(128) NOT NULL,
        verified_at DATETIME(6) NOT NULL,
        PRIMARY KEY (email),
        INDEX idx_verified_handle (handle)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_bin
"#;

/// Create both tables if they do not exist yet
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), InfrastructureError> {
    for statement in [CREATE_CHALLENGES_TABLE, CREATE_VERIFIED_TABLE] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema is up to date");
    Ok(())
}
