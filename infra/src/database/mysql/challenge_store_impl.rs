//! MySQL implementation of the ChallengeStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use hq_core::domain::entities::{Challenge, Key};
use hq_core::errors::StoreError;
use hq_core::repositories::ChallengeStore;

/// Challenges in the `challenges` table, one row per handle
pub struct MySqlChallengeStore {
    pool: MySqlPool,
}

impl MySqlChallengeStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_challenge(row: &sqlx::mysql::MySqlRow) -> Result<Challenge, StoreError> {
        let column = |e: sqlx::Error| StoreError::unavailable(format!("Malformed challenge row: {}", e));

        Ok(Challenge {
            handle: row.try_get("handle").map_err(column)?,
            email: row.try_get("email").map_err(column)?,
            code: row.try_get("code").map_err(column)?,
            issued_at: row.try_get::<DateTime<Utc>, _>("issued_at").map_err(column)?,
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at").map_err(column)?,
        })
    }
}

fn unavailable(action: &str, e: sqlx::Error) -> StoreError {
    tracing::error!(error = %e, "Failed to {}", action);
    StoreError::unavailable(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl ChallengeStore for MySqlChallengeStore {
    async fn put(&self, challenge: Challenge) -> Result<(), StoreError> {
        // Single statement: readers see either the old row or the new one
        let query = r#"
            INSERT INTO challenges (handle, email, code, issued_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                email = VALUES(email),
                code = VALUES(code),
                issued_at = VALUES(issued_at),
                expires_at = VALUES(expires_at)
        "#;

        sqlx::query(query)
            .bind(&challenge.handle)
            .bind(&challenge.email)
            .bind(&challenge.code)
            .bind(challenge.issued_at)
            .bind(challenge.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("store challenge", e))?;

        Ok(())
    }

    async fn get(&self, handle: &str) -> Result<Option<Challenge>, StoreError> {
        let query = r#"
            SELECT handle, email, code, issued_at, expires_at
            FROM challenges
            WHERE handle = ?
        "#;

        let row = sqlx::query(query)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("load challenge", e))?;

        row.as_ref().map(Self::row_to_challenge).transpose()
    }

    async fn delete(&self, key: &Key) -> Result<(), StoreError> {
        let query = match key {
            Key::Handle(_) => "DELETE FROM challenges WHERE handle = ?",
            Key::Email(_) => "DELETE FROM challenges WHERE email = ?",
        };

        sqlx::query(query)
            .bind(key.value())
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("delete challenge", e))?;

        Ok(())
    }

    async fn delete_if_current(&self, challenge: &Challenge) -> Result<bool, StoreError> {
        // `challenge` was read back from this table, so issued_at carries the column precision
        let query = r#"
            DELETE FROM challenges
            WHERE handle = ? AND code = ? AND issued_at = ?
        "#;

        let result = sqlx::query(query)
            .bind(&challenge.handle)
            .bind(&challenge.code)
            .bind(challenge.issued_at)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("delete challenge", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM challenges WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("purge expired challenges", e))?;

        Ok(result.rows_affected())
    }
}
