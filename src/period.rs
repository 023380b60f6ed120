//! Monthly publication periods and the backward lookback window.
//!
//! AIP revisions are published under a `YYYY-MM` path segment. A [`Period`]
//! is one such month; [`Lookback`] walks backward from a starting month for a
//! bounded number of steps and is the candidate sequence the resolver
//! consumes.
//!
//! # Example
//!
//! ```
//! use aip_core::period::Period;
//!
//! let start: Period = "2025-02".parse().unwrap();
//! let months: Vec<String> = start.lookback(3).map(|p| p.to_string()).collect();
//! assert_eq!(months, ["2025-02", "2025-01", "2024-12"]);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// Default number of months searched before a group is given up on.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 24;

/// A publication month.
///
/// Ordering is chronological, so `max()` over periods yields the newest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

/// Error returned when a `YYYY-MM` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period '{input}': expected YYYY-MM")]
pub struct ParsePeriodError {
    input: String,
}

impl Period {
    /// Creates a period, returning `None` when `month` is outside 1..=12.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The period containing the given calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in the local timezone.
    #[must_use]
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    /// The month before this one, crossing year boundaries.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Number of months from `self` forward to `later`.
    ///
    /// Negative when `later` is actually earlier.
    #[must_use]
    pub fn months_until(self, later: Self) -> i64 {
        let from = i64::from(self.year) * 12 + i64::from(self.month);
        let to = i64::from(later.year) * 12 + i64::from(later.month);
        to - from
    }

    /// Lazily yields `self` and up to `window - 1` preceding months.
    #[must_use]
    pub fn lookback(self, window: u32) -> Lookback {
        Lookback {
            next: self,
            remaining: window,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePeriodError {
            input: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Finite backward walk over months, newest first.
///
/// A clone replays the walk from the clone point.
#[derive(Debug, Clone)]
pub struct Lookback {
    next: Period,
    remaining: u32,
}

impl Iterator for Lookback {
    type Item = Period;

    fn next(&mut self) -> Option<Period> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next;
        self.next = current.previous();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Lookback {}

impl FusedIterator for Lookback {}
