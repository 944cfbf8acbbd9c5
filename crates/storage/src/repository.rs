use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use ascetic_core::model::{DayNumber, JournalEntry, ProgramState, Theme, UserId, WeekNumber};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of the per-user progress row.
///
/// This mirrors the hosted schema (`progress` table, unique on `user_id`)
/// so adapters can serialize without leaking storage concerns into the
/// domain. Conversion back into [`ProgramState`] is deliberately lossy:
/// values an older client may have written out of range are dropped and
/// unknown themes fall back to the default, keeping migration/defaulting
/// in this one place.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub start_date: Option<NaiveDate>,
    pub completed_days: Vec<i64>,
    pub practice_completions: BTreeMap<String, BTreeMap<String, bool>>,
    pub theme: String,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_state(user_id: UserId, state: &ProgramState, updated_at: DateTime<Utc>) -> Self {
        let completed_days = state
            .completed_days()
            .iter()
            .map(|day| i64::from(day.value()))
            .collect();

        let mut practice_completions = BTreeMap::new();
        for (day, weeks) in state.practice_completions() {
            let flags: BTreeMap<String, bool> = weeks
                .iter()
                .map(|week| (week.to_string(), true))
                .collect();
            if !flags.is_empty() {
                practice_completions.insert(day.to_string(), flags);
            }
        }

        Self {
            user_id,
            start_date: state.start_date(),
            completed_days,
            practice_completions,
            theme: state.theme().as_str().to_string(),
            updated_at,
        }
    }

    /// Rebuild domain state from the persisted row, without journal
    /// entries (those live in their own rows — see [`JournalRecord`]).
    #[must_use]
    pub fn into_state(self) -> ProgramState {
        let completed_days: BTreeSet<DayNumber> = self
            .completed_days
            .into_iter()
            .filter_map(|raw| u8::try_from(raw).ok())
            .filter_map(|raw| DayNumber::new(raw).ok())
            .collect();

        let mut practices: BTreeMap<DayNumber, BTreeSet<WeekNumber>> = BTreeMap::new();
        for (day_key, flags) in self.practice_completions {
            let Ok(day) = day_key.parse::<DayNumber>() else {
                continue;
            };
            let weeks: BTreeSet<WeekNumber> = flags
                .into_iter()
                .filter(|(_, checked)| *checked)
                .filter_map(|(week_key, _)| week_key.parse::<WeekNumber>().ok())
                .collect();
            if !weeks.is_empty() {
                practices.insert(day, weeks);
            }
        }

        let theme = self.theme.parse::<Theme>().unwrap_or_default();

        ProgramState::from_persisted(self.start_date, completed_days, practices, theme)
    }
}

/// Persisted shape of one journal row, unique on `(user_id, day_number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRecord {
    pub user_id: UserId,
    pub day_number: DayNumber,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

impl JournalRecord {
    #[must_use]
    pub fn from_entry(
        user_id: UserId,
        day_number: DayNumber,
        entry: &JournalEntry,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            day_number,
            text: entry.as_str().to_string(),
            updated_at,
        }
    }

    /// The stored text as a domain entry.
    #[must_use]
    pub fn entry(&self) -> JournalEntry {
        JournalEntry::from_persisted(&self.text)
    }
}

/// Repository contract for the per-user progress row.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress row for a user, or `None` when the user has no
    /// row yet (first visit — treated as empty state, never an error).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_progress(&self, user_id: UserId) -> Result<Option<ProgressRecord>, StorageError>;

    /// Insert or replace the progress row. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// Remove the progress row entirely.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection failures. Deleting a missing
    /// row is not an error.
    async fn delete_progress(&self, user_id: UserId) -> Result<(), StorageError>;
}

/// Repository contract for journal rows.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// Fetch every journal row for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_entries(&self, user_id: UserId) -> Result<Vec<JournalRecord>, StorageError>;

    /// Insert or replace one journal row. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn upsert_entry(&self, record: &JournalRecord) -> Result<(), StorageError>;

    /// Remove every journal row for a user (journey reset).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection failures.
    async fn delete_entries(&self, user_id: UserId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<UserId, ProgressRecord>>>,
    journals: Arc<Mutex<HashMap<(UserId, DayNumber), JournalRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, user_id: UserId) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn delete_progress(&self, user_id: UserId) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl JournalRepository for InMemoryRepository {
    async fn list_entries(&self, user_id: UserId) -> Result<Vec<JournalRecord>, StorageError> {
        let guard = self
            .journals
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut entries: Vec<JournalRecord> = guard
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by_key(|record| record.day_number);
        Ok(entries)
    }

    async fn upsert_entry(&self, record: &JournalRecord) -> Result<(), StorageError> {
        let mut guard = self
            .journals
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert((record.user_id, record.day_number), record.clone());
        Ok(())
    }

    async fn delete_entries(&self, user_id: UserId) -> Result<(), StorageError> {
        let mut guard = self
            .journals
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.retain(|(owner, _), _| *owner != user_id);
        Ok(())
    }
}

/// Aggregates both repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub journals: Arc<dyn JournalRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let journals: Arc<dyn JournalRepository> = Arc::new(repo);
        Self { progress, journals }
    }
}
