//! Report period and month-key types.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::reports::ReportError;

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Creates a month key, returning `None` if `month` is not in `1..=12`.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Returns the month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month (1-12).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error parsing a `YYYY-MM` month key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid month key: {0}")]
pub struct ParseMonthKeyError(String);

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseMonthKeyError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The requested reporting window and the month columns it produces.
///
/// A range inside one calendar month yields that single month. Any longer range
/// yields exactly its first and last month; interior months are never reported,
/// so amount arrays hold at most two values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    /// Month columns, one or two entries.
    pub months: Vec<MonthKey>,
}

impl ReportPeriod {
    /// Resolves the month columns for a date range.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `end` is before `start`.
    pub fn resolve(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if end < start {
            return Err(ReportError::InvalidDateRange { start, end });
        }

        let first = MonthKey::of(start);
        let last = MonthKey::of(end);
        let months = if first == last {
            vec![first]
        } else {
            vec![first, last]
        };

        Ok(Self {
            start_date: start,
            end_date: end,
            months,
        })
    }

    /// Number of month columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Always false for a resolved period; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Position of `month` among the columns, if reported.
    #[must_use]
    pub fn index_of(&self, month: MonthKey) -> Option<usize> {
        self.months.iter().position(|m| *m == month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day_is_single_month() {
        let period = ReportPeriod::resolve(date(2025, 1, 15), date(2025, 1, 15)).unwrap();
        let months: Vec<String> = period.months.iter().map(ToString::to_string).collect();
        assert_eq!(months, vec!["2025-01"]);
    }

    #[test]
    fn test_quarter_is_first_and_last_month() {
        let period = ReportPeriod::resolve(date(2025, 1, 1), date(2025, 3, 31)).unwrap();
        let months: Vec<String> = period.months.iter().map(ToString::to_string).collect();
        assert_eq!(months, vec!["2025-01", "2025-03"]);
    }

    #[test]
    fn test_range_across_year_boundary() {
        let period = ReportPeriod::resolve(date(2024, 12, 20), date(2025, 1, 5)).unwrap();
        let months: Vec<String> = period.months.iter().map(ToString::to_string).collect();
        assert_eq!(months, vec!["2024-12", "2025-01"]);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = ReportPeriod::resolve(date(2025, 2, 1), date(2025, 1, 31)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_month_key_parse_and_display() {
        let key: MonthKey = "2025-07".parse().unwrap();
        assert_eq!(key.year(), 2025);
        assert_eq!(key.month(), 7);
        assert_eq!(key.to_string(), "2025-07");
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("2025-7".parse::<MonthKey>().is_err());
        assert!("202507".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_serializes_as_string() {
        let key = MonthKey::new(2025, 3).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-03\"");
        let back: MonthKey = serde_json::from_str("\"2025-03\"").unwrap();
        assert_eq!(back, key);
    }

    proptest! {
        /// Any valid range produces one column when it stays within a month
        /// and two columns otherwise.
        #[test]
        fn prop_month_count(start_offset in 0i64..2000, length in 0i64..800) {
            let start = date(2020, 1, 1) + chrono::Duration::days(start_offset);
            let end = start + chrono::Duration::days(length);
            let period = ReportPeriod::resolve(start, end).unwrap();

            let same_month = MonthKey::of(start) == MonthKey::of(end);
            prop_assert_eq!(period.len(), if same_month { 1 } else { 2 });
            prop_assert_eq!(period.months[0], MonthKey::of(start));
            prop_assert_eq!(*period.months.last().unwrap(), MonthKey::of(end));
        }
    }
}
