//! MySQL implementation of the VerifiedStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use hq_core::domain::entities::VerifiedRecord;
use hq_core::errors::StoreError;
use hq_core::repositories::VerifiedStore;

/// Verified records in the `verified` table, unique by email
pub struct MySqlVerifiedStore {
    pool: MySqlPool,
}

impl MySqlVerifiedStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<VerifiedRecord, StoreError> {
        let column = |e: sqlx::Error| StoreError::unavailable(format!("Malformed verified row: {}", e));

        Ok(VerifiedRecord {
            email: row.try_get("email").map_err(column)?,
            handle: row.try_get("handle").map_err(column)?,
            verified_at: row.try_get::<DateTime<Utc>, _>("verified_at").map_err(column)?,
        })
    }
}

/// Whether an insert failed on the primary key (MySQL error 1062)
pub(crate) fn is_duplicate_key(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl VerifiedStore for MySqlVerifiedStore {
    async fn put(&self, record: VerifiedRecord) -> Result<(), StoreError> {
        // The primary key on email is the check-and-insert
        let result = sqlx::query("INSERT INTO verified (email, handle, verified_at) VALUES (?, ?, ?)")
            .bind(&record.email)
            .bind(&record.handle)
            .bind(record.verified_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateEmail),
            Err(e) => {
                tracing::error!(error = %e, "Failed to insert verified record");
                Err(StoreError::unavailable(format!("Failed to insert verified record: {}", e)))
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<VerifiedRecord>, StoreError> {
        let row = sqlx::query("SELECT email, handle, verified_at FROM verified WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to find verified record: {}", e)))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Vec<VerifiedRecord>, StoreError> {
        let query = r#"
            SELECT email, handle, verified_at
            FROM verified
            WHERE handle = ?
            ORDER BY verified_at ASC
        "#;

        let rows = sqlx::query(query)
            .bind(handle)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to find verified records: {}", e)))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn is_verified(&self, email: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM verified WHERE email = ?) AS present")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable(format!("Failed to check verified email: {}", e)))?;

        let present: i64 = row
            .try_get("present")
            .map_err(|e| StoreError::unavailable(format!("Malformed existence row: {}", e)))?;
        Ok(present == 1)
    }
}
