use async_trait::async_trait;

use ascetic_core::model::UserId;

use super::SqliteRepository;
use super::mapping::map_journal_row;
use crate::repository::{JournalRecord, JournalRepository, StorageError};

#[async_trait]
impl JournalRepository for SqliteRepository {
    async fn list_entries(&self, user_id: UserId) -> Result<Vec<JournalRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, day_number, text, updated_at
            FROM journals
            WHERE user_id = ?1
            ORDER BY day_number
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        rows.iter().map(map_journal_row).collect()
    }

    async fn upsert_entry(&self, record: &JournalRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO journals (user_id, day_number, text, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, day_number) DO UPDATE SET
                text = excluded.text,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.user_id.to_string())
        .bind(i64::from(record.day_number.value()))
        .bind(&record.text)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn delete_entries(&self, user_id: UserId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM journals WHERE user_id = ?1")
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
