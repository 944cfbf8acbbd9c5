pub mod ids;
pub mod journal;
mod state;
mod theme;

pub use ids::{DayNumber, DayOutOfRange, UserId, WeekNumber, WeekOutOfRange};
pub use journal::{JournalDraft, JournalEntry, JournalError, MAX_JOURNAL_LEN};
pub use state::ProgramState;
pub use theme::Theme;
