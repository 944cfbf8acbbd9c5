use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Identity that scopes every persisted row.
///
/// The hosted backend issues UUID user ids; the client-local fallback store
/// uses the fixed nil identity from [`UserId::local`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a `UserId` from a backend-issued UUID.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// The fixed identity used when no authenticated session exists.
    #[must_use]
    pub fn local() -> Self {
        Self(Uuid::nil())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// One of the 84 sequential days of the program.
///
/// Construction validates the range, so a `DayNumber` held anywhere in the
/// engine is always in `1..=84`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayNumber(u8);

/// Number of days in the program.
pub const PROGRAM_DAYS: u8 = 84;

/// Number of weeks in the program.
pub const PROGRAM_WEEKS: u8 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("day number {0} is outside 1..=84")]
pub struct DayOutOfRange(pub i64);

impl DayNumber {
    /// The first day of the program.
    pub const FIRST: DayNumber = DayNumber(1);

    /// The last day of the program.
    pub const LAST: DayNumber = DayNumber(PROGRAM_DAYS);

    /// Creates a `DayNumber`, rejecting values outside `1..=84`.
    ///
    /// # Errors
    ///
    /// Returns `DayOutOfRange` if `day` is not in `1..=84`.
    pub fn new(day: u8) -> Result<Self, DayOutOfRange> {
        if (1..=PROGRAM_DAYS).contains(&day) {
            Ok(Self(day))
        } else {
            Err(DayOutOfRange(i64::from(day)))
        }
    }

    /// Returns the underlying day number.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// The week this day belongs to (days 1-7 are week 1, and so on).
    #[must_use]
    pub fn week(&self) -> WeekNumber {
        WeekNumber((self.0 - 1) / 7 + 1)
    }

    /// Iterates every day of the program in order.
    pub fn all() -> impl Iterator<Item = DayNumber> {
        (1..=PROGRAM_DAYS).map(DayNumber)
    }
}

impl TryFrom<u8> for DayNumber {
    type Error = DayOutOfRange;

    fn try_from(day: u8) -> Result<Self, Self::Error> {
        Self::new(day)
    }
}

impl From<DayNumber> for u8 {
    fn from(day: DayNumber) -> Self {
        day.0
    }
}

/// One of the 12 weeks of the program; each week introduces one practice
/// that stays active for the rest of the journey.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekNumber(u8);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("week number {0} is outside 1..=12")]
pub struct WeekOutOfRange(pub i64);

impl WeekNumber {
    /// The first week of the program.
    pub const FIRST: WeekNumber = WeekNumber(1);

    /// The last week of the program.
    pub const LAST: WeekNumber = WeekNumber(PROGRAM_WEEKS);

    /// Creates a `WeekNumber`, rejecting values outside `1..=12`.
    ///
    /// # Errors
    ///
    /// Returns `WeekOutOfRange` if `week` is not in `1..=12`.
    pub fn new(week: u8) -> Result<Self, WeekOutOfRange> {
        if (1..=PROGRAM_WEEKS).contains(&week) {
            Ok(Self(week))
        } else {
            Err(WeekOutOfRange(i64::from(week)))
        }
    }

    /// Returns the underlying week number.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// The first day of this week.
    #[must_use]
    pub fn first_day(&self) -> DayNumber {
        DayNumber((self.0 - 1) * 7 + 1)
    }

    /// Iterates every week of the program in order.
    pub fn all() -> impl Iterator<Item = WeekNumber> {
        (1..=PROGRAM_WEEKS).map(WeekNumber)
    }
}

impl TryFrom<u8> for WeekNumber {
    type Error = WeekOutOfRange;

    fn try_from(week: u8) -> Result<Self, Self::Error> {
        Self::new(week)
    }
}

impl From<WeekNumber> for u8 {
    fn from(week: WeekNumber) -> Self {
        week.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Debug for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DayNumber({})", self.0)
    }
}

impl fmt::Debug for WeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeekNumber({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing an identifier from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse {kind} from string")]
pub struct ParseIdError {
    kind: &'static str,
}

impl FromStr for UserId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(UserId::new)
            .map_err(|_| ParseIdError { kind: "UserId" })
    }
}

impl FromStr for DayNumber {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u8>()
            .ok()
            .and_then(|value| DayNumber::new(value).ok())
            .ok_or(ParseIdError { kind: "DayNumber" })
    }
}

impl FromStr for WeekNumber {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u8>()
            .ok()
            .and_then(|value| WeekNumber::new(value).ok())
            .ok_or(ParseIdError { kind: "WeekNumber" })
    }
}
