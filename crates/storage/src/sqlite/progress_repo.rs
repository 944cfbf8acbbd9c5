use async_trait::async_trait;

use ascetic_core::model::UserId;

use super::SqliteRepository;
use super::mapping::{completed_days_json, map_progress_row, practice_completions_json};
use crate::repository::{ProgressRecord, ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, user_id: UserId) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, start_date, completed_days, practice_completions, theme, updated_at
            FROM progress
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress (
                user_id,
                start_date,
                completed_days,
                practice_completions,
                theme,
                updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id) DO UPDATE SET
                start_date = excluded.start_date,
                completed_days = excluded.completed_days,
                practice_completions = excluded.practice_completions,
                theme = excluded.theme,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record.user_id.to_string())
        .bind(record.start_date)
        .bind(completed_days_json(record)?)
        .bind(practice_completions_json(record)?)
        .bind(&record.theme)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn delete_progress(&self, user_id: UserId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM progress WHERE user_id = ?1")
            .bind(user_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
