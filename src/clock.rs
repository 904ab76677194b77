//! Clock abstraction for deterministic time handling.
//!
//! Every operation in the billing core reads the current instant through a
//! [`Clock`] passed in by the caller instead of calling `Utc::now()` directly.
//! Production code passes [`Clock::system`]; tests pass a fixed clock so
//! day-boundary behavior (overdue checks, sweep windows, report buckets) can
//! be asserted exactly.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Source of the current instant for all time-sensitive operations.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Wall-clock time from the operating system
    #[default]
    System,
    /// A pinned instant, for tests
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// The wall clock.
    #[must_use]
    pub const fn system() -> Self {
        Self::System
    }

    /// A clock pinned to the given instant.
    #[must_use]
    pub const fn fixed(instant: DateTime<Utc>) -> Self {
        Self::Fixed(instant)
    }

    /// A clock pinned to midnight UTC on the given date.
    #[must_use]
    pub fn fixed_date(date: NaiveDate) -> Self {
        Self::Fixed(date.and_time(NaiveTime::MIN).and_utc())
    }

    /// The current instant.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(instant) => *instant,
        }
    }

    /// The current calendar day. All overdue and scheduling comparisons in the
    /// core are date-only and go through this method.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
