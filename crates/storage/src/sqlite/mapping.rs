use std::collections::BTreeMap;
use std::str::FromStr;

use ascetic_core::model::{DayNumber, UserId};
use sqlx::Row;

use crate::repository::{JournalRecord, ProgressRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn user_id_from_text(raw: &str) -> Result<UserId, StorageError> {
    UserId::from_str(raw).map_err(ser)
}

pub(crate) fn day_number_from_i64(raw: i64) -> Result<DayNumber, StorageError> {
    u8::try_from(raw)
        .ok()
        .and_then(|value| DayNumber::new(value).ok())
        .ok_or_else(|| StorageError::Serialization(format!("invalid day_number: {raw}")))
}

pub(crate) fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressRecord, StorageError> {
    let user_id = user_id_from_text(&row.try_get::<String, _>("user_id").map_err(ser)?)?;

    let completed_days: Vec<i64> =
        serde_json::from_str(&row.try_get::<String, _>("completed_days").map_err(ser)?)
            .map_err(ser)?;

    let practice_completions: BTreeMap<String, BTreeMap<String, bool>> = serde_json::from_str(
        &row.try_get::<String, _>("practice_completions").map_err(ser)?,
    )
    .map_err(ser)?;

    Ok(ProgressRecord {
        user_id,
        start_date: row.try_get("start_date").map_err(ser)?,
        completed_days,
        practice_completions,
        theme: row.try_get("theme").map_err(ser)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}

pub(crate) fn map_journal_row(row: &sqlx::sqlite::SqliteRow) -> Result<JournalRecord, StorageError> {
    Ok(JournalRecord {
        user_id: user_id_from_text(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        day_number: day_number_from_i64(row.try_get::<i64, _>("day_number").map_err(ser)?)?,
        text: row.try_get("text").map_err(ser)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}

pub(crate) fn completed_days_json(record: &ProgressRecord) -> Result<String, StorageError> {
    serde_json::to_string(&record.completed_days).map_err(ser)
}

pub(crate) fn practice_completions_json(record: &ProgressRecord) -> Result<String, StorageError> {
    serde_json::to_string(&record.practice_completions).map_err(ser)
}
