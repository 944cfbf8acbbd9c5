use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use ascetic_core::engine::{self, CompletionPolicy, DayCompletionStatus};
use ascetic_core::model::{
    DayNumber, JournalDraft, ProgramState, Theme, UserId, WeekNumber,
};
use ascetic_core::time::Clock;
use storage::repository::{
    JournalRecord, JournalRepository, ProgressRecord, ProgressRepository, Storage, StorageError,
};

use crate::error::ProgressError;
use crate::sync::{RetryPolicy, SyncStatus};

/// The progress engine as an explicit service object.
///
/// Owns the in-memory `ProgramState` for one user and writes every
/// mutation through to the persistence gateway. Queries are answered from
/// memory via the pure engine, with the date coming from the injected
/// clock; state read from another device after this service loaded stays
/// invisible until the next [`ProgressService::load`].
///
/// Writes are optimistic: local state changes first, and a failed gateway
/// write (after bounded retries) is logged and reported through
/// [`ProgressService::sync_status`] rather than rolled back.
pub struct ProgressService {
    clock: Clock,
    user_id: UserId,
    policy: CompletionPolicy,
    retry: RetryPolicy,
    progress_repo: Arc<dyn ProgressRepository>,
    journal_repo: Arc<dyn JournalRepository>,
    state: Mutex<ProgramState>,
    sync: Mutex<SyncStatus>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, user_id: UserId, storage: &Storage, policy: CompletionPolicy) -> Self {
        Self {
            clock,
            user_id,
            policy,
            retry: RetryPolicy::default(),
            progress_repo: Arc::clone(&storage.progress),
            journal_repo: Arc::clone(&storage.journals),
            state: Mutex::new(ProgramState::new()),
            sync: Mutex::new(SyncStatus::Synced),
        }
    }

    /// Replace the write retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn completion_policy(&self) -> CompletionPolicy {
        self.policy
    }

    /// Load persisted state, replacing whatever is in memory.
    ///
    /// Absent rows are empty state, not an error. This is the one
    /// operation where a gateway failure surfaces: nothing optimistic has
    /// been rendered yet, so the caller should know the load failed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on connection or decoding
    /// failures.
    pub async fn load(&self) -> Result<(), ProgressError> {
        let record = match self.progress_repo.get_progress(self.user_id).await {
            Ok(record) => record,
            Err(StorageError::NotFound) => None,
            Err(err) => return Err(err.into()),
        };
        let rows = match self.journal_repo.list_entries(self.user_id).await {
            Ok(rows) => rows,
            Err(StorageError::NotFound) => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let mut state = record.map(ProgressRecord::into_state).unwrap_or_default();
        for row in rows {
            state.attach_journal(row.day_number, row.entry());
        }

        *self.state() = state;
        self.set_sync(SyncStatus::Synced);
        Ok(())
    }

    /// The day unlocked by the calendar right now.
    #[must_use]
    pub fn current_day(&self) -> DayNumber {
        engine::current_day(&self.state(), self.clock.today())
    }

    #[must_use]
    pub fn is_day_available(&self, day: DayNumber) -> bool {
        engine::is_day_available(&self.state(), day, self.clock.today())
    }

    #[must_use]
    pub fn is_day_complete(&self, day: DayNumber) -> bool {
        engine::is_day_complete(&self.state(), day, self.policy)
    }

    #[must_use]
    pub fn completion_status(&self, day: DayNumber) -> DayCompletionStatus {
        engine::completion_status(&self.state(), day)
    }

    /// The stored journal text for a day; empty when none exists.
    #[must_use]
    pub fn journal_entry(&self, day: DayNumber) -> String {
        self.state()
            .journal_entry(day)
            .map(|entry| entry.as_str().to_string())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.state().start_date()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.state().theme()
    }

    /// A point-in-time copy of the full state, for rendering.
    #[must_use]
    pub fn snapshot(&self) -> ProgramState {
        self.state().clone()
    }

    #[must_use]
    pub fn sync_status(&self) -> SyncStatus {
        *self.sync.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Anchor the journey at today's date.
    ///
    /// No-op (and no write) when a journey is already under way or prior
    /// progress exists; returns whether the journey started.
    pub async fn start_journey(&self) -> bool {
        let started = self.state().start_journey(self.clock.today());
        if started {
            self.write_progress().await;
        }
        started
    }

    /// Clear the journey and delete-through the journal rows.
    pub async fn reset_journey(&self) {
        self.state().reset();
        self.delete_journals().await;
        self.write_progress().await;
    }

    /// Mark a day complete. Idempotent; an already-complete day issues no
    /// write.
    pub async fn complete_day(&self, day: DayNumber) {
        if self.state().mark_day_complete(day) {
            self.write_progress().await;
        }
    }

    /// Sanitize and store journal text for a day, writing the row through.
    ///
    /// Non-empty text auto-completes the day, which also writes the
    /// progress row. The stored value supersedes whatever was there —
    /// last write wins, no merge.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Journal` when the raw text exceeds the
    /// maximum length; nothing is stored in that case.
    pub async fn set_journal_entry(&self, day: DayNumber, text: &str) -> Result<(), ProgressError> {
        let entry = JournalDraft::new(text).sanitize()?;
        let (record, completion_changed) = {
            let mut state = self.state();
            let completion_changed = state.set_journal_entry(day, entry.clone());
            let record = JournalRecord::from_entry(self.user_id, day, &entry, self.clock.now());
            (record, completion_changed)
        };

        self.write_journal(&record).await;
        if completion_changed {
            self.write_progress().await;
        }
        Ok(())
    }

    /// Flip one practice checkbox; returns the new checked state.
    pub async fn toggle_practice(&self, day: DayNumber, week: WeekNumber) -> bool {
        let checked = self.state().toggle_practice(day, week);
        self.write_progress().await;
        checked
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.state().set_theme(theme);
        self.write_progress().await;
    }

    fn state(&self) -> MutexGuard<'_, ProgramState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_sync(&self, status: SyncStatus) {
        *self.sync.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    async fn write_progress(&self) {
        let record = ProgressRecord::from_state(self.user_id, &self.state(), self.clock.now());
        self.set_sync(SyncStatus::Syncing);
        match self
            .retry
            .run(|| self.progress_repo.upsert_progress(&record))
            .await
        {
            Ok(()) => self.set_sync(SyncStatus::Synced),
            Err(err) => {
                tracing::warn!(user = %self.user_id, error = %err,
                    "progress write failed; keeping local state");
                self.set_sync(SyncStatus::Dirty);
            }
        }
    }

    async fn write_journal(&self, record: &JournalRecord) {
        self.set_sync(SyncStatus::Syncing);
        match self
            .retry
            .run(|| self.journal_repo.upsert_entry(record))
            .await
        {
            Ok(()) => self.set_sync(SyncStatus::Synced),
            Err(err) => {
                tracing::warn!(user = %self.user_id, day = %record.day_number, error = %err,
                    "journal write failed; keeping local state");
                self.set_sync(SyncStatus::Dirty);
            }
        }
    }

    async fn delete_journals(&self) {
        self.set_sync(SyncStatus::Syncing);
        match self
            .retry
            .run(|| self.journal_repo.delete_entries(self.user_id))
            .await
        {
            Ok(()) => self.set_sync(SyncStatus::Synced),
            Err(err) => {
                tracing::warn!(user = %self.user_id, error = %err,
                    "journal delete failed during reset");
                self.set_sync(SyncStatus::Dirty);
            }
        }
    }
}
