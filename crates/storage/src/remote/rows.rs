use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ascetic_core::model::{DayNumber, UserId};

use crate::repository::{JournalRecord, ProgressRecord, StorageError};

/// Wire shape of one `progress` row as the hosted REST API serves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRow {
    pub user_id: Uuid,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_days: Vec<i64>,
    #[serde(default)]
    pub practice_completions: BTreeMap<String, BTreeMap<String, bool>>,
    pub theme: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRow {
    #[must_use]
    pub fn from_record(record: &ProgressRecord) -> Self {
        Self {
            user_id: record.user_id.value(),
            start_date: record.start_date,
            completed_days: record.completed_days.clone(),
            practice_completions: record.practice_completions.clone(),
            theme: Some(record.theme.clone()),
            updated_at: record.updated_at,
        }
    }

    #[must_use]
    pub fn into_record(self) -> ProgressRecord {
        ProgressRecord {
            user_id: UserId::new(self.user_id),
            start_date: self.start_date,
            completed_days: self.completed_days,
            practice_completions: self.practice_completions,
            theme: self.theme.unwrap_or_else(|| "light".to_string()),
            updated_at: self.updated_at,
        }
    }
}

/// Wire shape of one `journals` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRow {
    pub user_id: Uuid,
    pub day_number: i64,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

impl JournalRow {
    #[must_use]
    pub fn from_record(record: &JournalRecord) -> Self {
        Self {
            user_id: record.user_id.value(),
            day_number: i64::from(record.day_number.value()),
            text: record.text.clone(),
            updated_at: record.updated_at,
        }
    }

    /// Convert the row back into a record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored day number is
    /// outside the program range.
    pub fn into_record(self) -> Result<JournalRecord, StorageError> {
        let day_number = u8::try_from(self.day_number)
            .ok()
            .and_then(|value| DayNumber::new(value).ok())
            .ok_or_else(|| {
                StorageError::Serialization(format!("invalid day_number: {}", self.day_number))
            })?;

        Ok(JournalRecord {
            user_id: UserId::new(self.user_id),
            day_number,
            text: self.text,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascetic_core::time::fixed_now;

    #[test]
    fn progress_row_parses_hosted_json() {
        let json = r#"
            {
                "user_id": "11111111-2222-3333-4444-555555555555",
                "start_date": "2024-03-01",
                "completed_days": [1, 2, 3],
                "practice_completions": {"2": {"1": true}},
                "theme": "dark",
                "updated_at": "2024-03-04T08:00:00Z"
            }
        "#;
        let row: ProgressRow = serde_json::from_str(json).unwrap();
        let record = row.into_record();
        assert_eq!(record.completed_days, vec![1, 2, 3]);
        assert_eq!(record.theme, "dark");
        assert_eq!(
            record.start_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn progress_row_defaults_missing_columns() {
        let json = r#"
            {
                "user_id": "11111111-2222-3333-4444-555555555555",
                "start_date": null,
                "theme": null,
                "updated_at": "2024-03-04T08:00:00Z"
            }
        "#;
        let row: ProgressRow = serde_json::from_str(json).unwrap();
        let record = row.into_record();
        assert!(record.completed_days.is_empty());
        assert!(record.practice_completions.is_empty());
        assert_eq!(record.theme, "light");
    }

    #[test]
    fn journal_row_rejects_out_of_range_day() {
        let row = JournalRow {
            user_id: Uuid::nil(),
            day_number: 120,
            text: "stored by an older client".to_string(),
            updated_at: fixed_now(),
        };
        assert!(row.into_record().is_err());
    }
}
