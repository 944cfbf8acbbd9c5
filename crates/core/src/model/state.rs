use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::model::ids::{DayNumber, WeekNumber};
use crate::model::journal::JournalEntry;
use crate::model::theme::Theme;

/// The full per-user program state: journey anchor, completion flags,
/// journal entries, and per-day practice checklists.
///
/// Mutations here are pure; write-through to the persistence gateway is the
/// service layer's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramState {
    start_date: Option<NaiveDate>,
    completed_days: BTreeSet<DayNumber>,
    journal_entries: BTreeMap<DayNumber, JournalEntry>,
    practice_completions: BTreeMap<DayNumber, BTreeSet<WeekNumber>>,
    theme: Theme,
}

impl ProgramState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from persisted progress fields. Journal entries are
    /// attached separately via [`ProgramState::attach_journal`] because they
    /// live in their own rows.
    #[must_use]
    pub fn from_persisted(
        start_date: Option<NaiveDate>,
        completed_days: BTreeSet<DayNumber>,
        practice_completions: BTreeMap<DayNumber, BTreeSet<WeekNumber>>,
        theme: Theme,
    ) -> Self {
        Self {
            start_date,
            completed_days,
            journal_entries: BTreeMap::new(),
            practice_completions,
            theme,
        }
    }

    /// Attach a loaded journal row. Empty entries are equivalent to an
    /// absent key and are not stored.
    pub fn attach_journal(&mut self, day: DayNumber, entry: JournalEntry) {
        if entry.is_empty() {
            self.journal_entries.remove(&day);
        } else {
            self.journal_entries.insert(day, entry);
        }
    }

    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    #[must_use]
    pub fn completed_days(&self) -> &BTreeSet<DayNumber> {
        &self.completed_days
    }

    #[must_use]
    pub fn journal_entry(&self, day: DayNumber) -> Option<&JournalEntry> {
        self.journal_entries.get(&day)
    }

    #[must_use]
    pub fn journal_entries(&self) -> &BTreeMap<DayNumber, JournalEntry> {
        &self.journal_entries
    }

    /// Weeks whose practice is checked off for the given day.
    #[must_use]
    pub fn practices_checked(&self, day: DayNumber) -> &BTreeSet<WeekNumber> {
        static EMPTY: BTreeSet<WeekNumber> = BTreeSet::new();
        self.practice_completions.get(&day).unwrap_or(&EMPTY)
    }

    #[must_use]
    pub fn practice_completions(&self) -> &BTreeMap<DayNumber, BTreeSet<WeekNumber>> {
        &self.practice_completions
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Anchor the journey at `today`.
    ///
    /// Takes effect only when no start date is set and no progress exists
    /// yet; repeated calls (duplicate mount effects) are no-ops. Returns
    /// whether the journey was started.
    pub fn start_journey(&mut self, today: NaiveDate) -> bool {
        if self.start_date.is_some() || !self.completed_days.is_empty()
            || !self.journal_entries.is_empty()
        {
            return false;
        }
        self.start_date = Some(today);
        true
    }

    /// Clear the journey: start date, completions, journals, and practice
    /// checklists. The theme preference survives.
    pub fn reset(&mut self) {
        self.start_date = None;
        self.completed_days.clear();
        self.journal_entries.clear();
        self.practice_completions.clear();
    }

    /// Mark a day complete. Idempotent; returns whether the set changed.
    pub fn mark_day_complete(&mut self, day: DayNumber) -> bool {
        self.completed_days.insert(day)
    }

    /// Store a journal entry for a day.
    ///
    /// A non-empty entry also marks the day complete (journaling
    /// auto-completes). Returns whether the completion set changed.
    pub fn set_journal_entry(&mut self, day: DayNumber, entry: JournalEntry) -> bool {
        let auto_complete = !entry.is_empty();
        self.attach_journal(day, entry);
        if auto_complete {
            self.mark_day_complete(day)
        } else {
            false
        }
    }

    /// Flip the practice flag for `(day, week)`; returns the new state.
    pub fn toggle_practice(&mut self, day: DayNumber, week: WeekNumber) -> bool {
        let checked = self.practice_completions.entry(day).or_default();
        if checked.remove(&week) {
            if checked.is_empty() {
                self.practice_completions.remove(&day);
            }
            false
        } else {
            checked.insert(week);
            true
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::journal::JournalDraft;
    use crate::time::fixed_today;

    fn day(n: u8) -> DayNumber {
        DayNumber::new(n).unwrap()
    }

    fn week(n: u8) -> WeekNumber {
        WeekNumber::new(n).unwrap()
    }

    fn entry(text: &str) -> JournalEntry {
        JournalDraft::new(text).sanitize().unwrap()
    }

    #[test]
    fn start_journey_sets_date_once() {
        let mut state = ProgramState::new();
        assert!(state.start_journey(fixed_today()));
        assert!(!state.start_journey(fixed_today() + chrono::Duration::days(3)));
        assert_eq!(state.start_date(), Some(fixed_today()));
    }

    #[test]
    fn start_journey_refuses_when_progress_exists() {
        let mut state = ProgramState::new();
        state.mark_day_complete(day(2));
        assert!(!state.start_journey(fixed_today()));
        assert_eq!(state.start_date(), None);

        let mut state = ProgramState::new();
        state.set_journal_entry(day(1), entry("kept a journal before starting"));
        assert!(!state.start_journey(fixed_today()));
    }

    #[test]
    fn mark_day_complete_is_idempotent() {
        let mut state = ProgramState::new();
        assert!(state.mark_day_complete(day(5)));
        assert!(!state.mark_day_complete(day(5)));
        assert_eq!(state.completed_days().len(), 1);
    }

    #[test]
    fn journaling_auto_completes_the_day() {
        let mut state = ProgramState::new();
        assert!(state.set_journal_entry(day(3), entry("sat in silence")));
        assert!(state.completed_days().contains(&day(3)));
    }

    #[test]
    fn empty_journal_does_not_complete_and_clears_the_key() {
        let mut state = ProgramState::new();
        assert!(!state.set_journal_entry(day(3), entry("   ")));
        assert!(state.completed_days().is_empty());
        assert!(state.journal_entry(day(3)).is_none());
    }

    #[test]
    fn toggle_practice_flips_and_prunes() {
        let mut state = ProgramState::new();
        assert!(state.toggle_practice(day(10), week(1)));
        assert!(state.practices_checked(day(10)).contains(&week(1)));
        assert!(!state.toggle_practice(day(10), week(1)));
        assert!(state.practice_completions().is_empty());
    }

    #[test]
    fn reset_clears_progress_but_keeps_theme() {
        let mut state = ProgramState::new();
        state.set_theme(Theme::Monastic);
        state.start_journey(fixed_today());
        state.set_journal_entry(day(1), entry("day one"));
        state.toggle_practice(day(1), week(1));

        state.reset();

        assert_eq!(state.start_date(), None);
        assert!(state.completed_days().is_empty());
        assert!(state.journal_entries().is_empty());
        assert!(state.practice_completions().is_empty());
        assert_eq!(state.theme(), Theme::Monastic);
    }
}
