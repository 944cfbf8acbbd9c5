use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted journal length, in characters, before sanitization.
pub const MAX_JOURNAL_LEN: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum JournalError {
    #[error("journal text is {len} characters, maximum is {max}")]
    TooLong { len: usize, max: usize },
}

/// Raw journal text as received from the caller, before sanitization.
#[derive(Debug, Clone)]
pub struct JournalDraft {
    text: String,
}

impl JournalDraft {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Validate and sanitize the draft into a storable entry.
    ///
    /// Oversized input is rejected before sanitization; accepted input has
    /// all markup stripped (plain text only) and surrounding whitespace
    /// trimmed. Nothing is silently truncated.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::TooLong` if the raw text exceeds
    /// [`MAX_JOURNAL_LEN`] characters.
    pub fn sanitize(self) -> Result<JournalEntry, JournalError> {
        let len = self.text.chars().count();
        if len > MAX_JOURNAL_LEN {
            return Err(JournalError::TooLong {
                len,
                max: MAX_JOURNAL_LEN,
            });
        }

        let clean = ammonia::Builder::empty().clean(&self.text).to_string();
        Ok(JournalEntry {
            text: clean.trim().to_string(),
        })
    }
}

/// Sanitized, trimmed reflection text for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalEntry {
    text: String,
}

impl JournalEntry {
    /// Rehydrate an entry from storage.
    ///
    /// Stored text was sanitized on the way in, so this only re-trims.
    #[must_use]
    pub fn from_persisted(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_down_to_text() {
        let entry = JournalDraft::new("<b>quiet</b> morning <script>alert(1)</script>")
            .sanitize()
            .unwrap();
        assert_eq!(entry.as_str(), "quiet morning");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let entry = JournalDraft::new("   a slow day   ").sanitize().unwrap();
        assert_eq!(entry.as_str(), "a slow day");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        let entry = JournalDraft::new("   \n\t  ").sanitize().unwrap();
        assert!(entry.is_empty());
    }

    #[test]
    fn rejects_oversized_text_without_truncating() {
        let raw = "a".repeat(MAX_JOURNAL_LEN + 1);
        let err = JournalDraft::new(raw).sanitize().unwrap_err();
        assert_eq!(
            err,
            JournalError::TooLong {
                len: MAX_JOURNAL_LEN + 1,
                max: MAX_JOURNAL_LEN,
            }
        );
    }

    #[test]
    fn accepts_text_at_the_limit() {
        let raw = "a".repeat(MAX_JOURNAL_LEN);
        let entry = JournalDraft::new(raw).sanitize().unwrap();
        assert_eq!(entry.as_str().len(), MAX_JOURNAL_LEN);
    }

    #[test]
    fn persisted_entries_are_retrimmed() {
        let entry = JournalEntry::from_persisted(" kept \n");
        assert_eq!(entry.as_str(), "kept");
    }
}
