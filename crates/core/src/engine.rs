//! Pure progress queries: which day is unlocked, whether a day is
//! available, and how complete a day is.
//!
//! Every function takes `today` explicitly so callers (and tests) control
//! the date source; nothing here reads the system clock.

use chrono::NaiveDate;

use crate::model::{DayNumber, ProgramState, WeekNumber};

/// Which of the two historical completion rules is in force.
///
/// The rule is chosen once at service construction and never inferred from
/// the shape of the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// A day counts as complete when it was explicitly marked complete or
    /// carries a non-empty journal entry.
    #[default]
    JournalOrFlag,
    /// A day counts as complete only when every practice active on that
    /// day is checked off and the journal entry is non-empty.
    PracticesAndJournal,
}

/// Per-day completion breakdown for rendering checklists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCompletionStatus {
    pub practices_completed: u8,
    pub practices_total: u8,
    pub has_journal: bool,
    pub is_fully_complete: bool,
}

/// The day unlocked by the calendar.
///
/// Without a start date the journey sits on day 1. Otherwise the result is
/// `start..today` in whole calendar days, clamped to the program range, so
/// it is always in `1..=84` no matter how far `today` drifts.
#[must_use]
pub fn current_day(state: &ProgramState, today: NaiveDate) -> DayNumber {
    let Some(start) = state.start_date() else {
        return DayNumber::FIRST;
    };
    let elapsed = (today - start).num_days();
    let day = (elapsed + 1).clamp(1, i64::from(DayNumber::LAST.value()));
    // Clamped into range above, so the conversion cannot fail.
    DayNumber::new(day as u8).unwrap_or(DayNumber::FIRST)
}

/// Whether a day is unlocked on `today`.
///
/// Before the journey starts only day 1 is reachable; afterwards every day
/// up to [`current_day`] is, which makes availability monotonic in the day
/// number.
#[must_use]
pub fn is_day_available(state: &ProgramState, day: DayNumber, today: NaiveDate) -> bool {
    if state.start_date().is_none() {
        return day == DayNumber::FIRST;
    }
    day <= current_day(state, today)
}

/// Whether a day counts as complete under the given policy.
#[must_use]
pub fn is_day_complete(state: &ProgramState, day: DayNumber, policy: CompletionPolicy) -> bool {
    match policy {
        CompletionPolicy::JournalOrFlag => {
            state.completed_days().contains(&day) || has_journal(state, day)
        }
        CompletionPolicy::PracticesAndJournal => completion_status(state, day).is_fully_complete,
    }
}

/// Per-day checklist breakdown.
///
/// Practices accumulate: every week up to the day's own week contributes
/// one required practice, so day 3 requires week 1's practice and day 84
/// requires all twelve.
#[must_use]
pub fn completion_status(state: &ProgramState, day: DayNumber) -> DayCompletionStatus {
    let practices_total = day.week().value();
    let checked = state.practices_checked(day);
    let practices_completed = WeekNumber::all()
        .filter(|week| week.value() <= practices_total && checked.contains(week))
        .count() as u8;
    let has_journal = has_journal(state, day);

    DayCompletionStatus {
        practices_completed,
        practices_total,
        has_journal,
        is_fully_complete: practices_completed == practices_total && has_journal,
    }
}

fn has_journal(state: &ProgramState, day: DayNumber) -> bool {
    state
        .journal_entry(day)
        .is_some_and(|entry| !entry.as_str().trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JournalDraft, JournalEntry};
    use crate::time::fixed_today;
    use chrono::Duration;

    fn day(n: u8) -> DayNumber {
        DayNumber::new(n).unwrap()
    }

    fn week(n: u8) -> WeekNumber {
        WeekNumber::new(n).unwrap()
    }

    fn entry(text: &str) -> JournalEntry {
        JournalDraft::new(text).sanitize().unwrap()
    }

    fn started(days_ago: i64) -> ProgramState {
        let mut state = ProgramState::new();
        assert!(state.start_journey(fixed_today() - Duration::days(days_ago)));
        state
    }

    #[test]
    fn unstarted_journey_sits_on_day_one() {
        let state = ProgramState::new();
        assert_eq!(current_day(&state, fixed_today()), DayNumber::FIRST);
        assert!(is_day_available(&state, day(1), fixed_today()));
        assert!(!is_day_available(&state, day(2), fixed_today()));
    }

    #[test]
    fn ten_days_in_unlocks_day_eleven() {
        let state = started(10);
        assert_eq!(current_day(&state, fixed_today()).value(), 11);
        assert!(is_day_available(&state, day(11), fixed_today()));
        assert!(!is_day_available(&state, day(12), fixed_today()));
    }

    #[test]
    fn long_past_journeys_clamp_to_the_last_day() {
        let state = started(200);
        assert_eq!(current_day(&state, fixed_today()), DayNumber::LAST);
        assert!(DayNumber::all().all(|d| is_day_available(&state, d, fixed_today())));
    }

    #[test]
    fn start_date_in_the_future_clamps_to_day_one() {
        let state = started(-5);
        assert_eq!(current_day(&state, fixed_today()), DayNumber::FIRST);
    }

    #[test]
    fn current_day_stays_in_range_for_any_date() {
        let state = started(0);
        for offset in [-400_i64, -1, 0, 1, 41, 83, 84, 85, 10_000] {
            let today = fixed_today() + Duration::days(offset);
            let current = current_day(&state, today);
            assert!((1..=84).contains(&current.value()), "offset {offset}");
        }
    }

    #[test]
    fn availability_is_monotonic() {
        for days_ago in [0_i64, 3, 40, 83, 200] {
            let state = started(days_ago);
            let mut previous = true;
            for d in DayNumber::all() {
                let available = is_day_available(&state, d, fixed_today());
                assert!(
                    previous || !available,
                    "day {d} available while day {} is not (start {days_ago} days ago)",
                    d.value() - 1
                );
                previous = available;
            }
        }
    }

    #[test]
    fn completion_follows_flag_or_journal() {
        let mut state = started(5);
        assert!(!is_day_complete(&state, day(2), CompletionPolicy::JournalOrFlag));

        state.mark_day_complete(day(2));
        assert!(is_day_complete(&state, day(2), CompletionPolicy::JournalOrFlag));

        state.set_journal_entry(day(3), entry("walked without my phone"));
        assert!(is_day_complete(&state, day(3), CompletionPolicy::JournalOrFlag));
    }

    #[test]
    fn whitespace_journal_does_not_complete() {
        let mut state = started(5);
        state.set_journal_entry(day(4), entry("   "));
        assert!(!is_day_complete(&state, day(4), CompletionPolicy::JournalOrFlag));
    }

    #[test]
    fn reset_returns_to_day_one_with_nothing_complete() {
        let mut state = started(30);
        state.set_journal_entry(day(9), entry("cold water again"));
        state.reset();

        assert_eq!(current_day(&state, fixed_today()), DayNumber::FIRST);
        for d in DayNumber::all() {
            assert!(!is_day_complete(&state, d, CompletionPolicy::JournalOrFlag));
        }
    }

    #[test]
    fn status_counts_cumulative_practices() {
        let state = ProgramState::new();
        assert_eq!(completion_status(&state, day(3)).practices_total, 1);
        assert_eq!(completion_status(&state, day(8)).practices_total, 2);
        assert_eq!(completion_status(&state, day(84)).practices_total, 12);
    }

    #[test]
    fn practice_variant_day_three_scenario() {
        // Week 1 is the only active week on day 3: one checked practice
        // plus a journal entry makes the day fully complete.
        let mut state = started(10);
        let status = completion_status(&state, day(3));
        assert_eq!(status.practices_total, 1);
        assert_eq!(status.practices_completed, 0);
        assert!(!status.is_fully_complete);

        state.toggle_practice(day(3), week(1));
        state.set_journal_entry(day(3), entry("one meal, eaten slowly"));

        let status = completion_status(&state, day(3));
        assert_eq!(status.practices_completed, 1);
        assert!(status.has_journal);
        assert!(status.is_fully_complete);
        assert!(is_day_complete(&state, day(3), CompletionPolicy::PracticesAndJournal));
    }

    #[test]
    fn strict_policy_requires_both_halves() {
        let mut state = started(10);
        state.toggle_practice(day(3), week(1));
        assert!(!is_day_complete(&state, day(3), CompletionPolicy::PracticesAndJournal));

        // Unchecking the practice moves the day back to partial even though
        // the journal auto-completed it under the simple rule.
        state.set_journal_entry(day(3), entry("present"));
        state.toggle_practice(day(3), week(1));
        assert!(!is_day_complete(&state, day(3), CompletionPolicy::PracticesAndJournal));
        assert!(is_day_complete(&state, day(3), CompletionPolicy::JournalOrFlag));
    }
}
