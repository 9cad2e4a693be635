//! Time abstraction for testability.
//!
//! This module provides a [`Clock`] trait that allows injecting fixed clocks
//! in tests while using the real system clock in production, plus the
//! conversion from wall-clock time to the UTC calendar day used by the
//! notification policy.

use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, Utc};

/// Abstraction over system time for testability.
///
/// # Example
///
/// ```
/// use ipnotify::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;

    /// Returns the current calendar day in UTC.
    fn today(&self) -> NaiveDate {
        utc_date(self.now())
    }
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Truncates a point in time to its calendar day in UTC.
#[must_use]
pub fn utc_date(time: SystemTime) -> NaiveDate {
    DateTime::<Utc>::from(time).date_naive()
}

/// Formats a calendar day the way it appears in diagnostic output (`YYYY/MM/DD`).
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}
