//! Weekday selection and date expansion.
//!
//! Turns week-level plan items into calendar dates restricted to the
//! student's chosen weekdays.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use study_schedule::weekdays::{expand_dates, WeekdaySet};
//!
//! let mon_wed_fri = WeekdaySet::new([1, 3, 5]).unwrap();
//! let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(); // a Monday
//! let end = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
//! let dated = expand_dates(start, end, &[], &mon_wed_fri);
//! assert!(dated.is_empty());
//! ```
//!
//! Weekdays are numbered 0 = Sunday through 6 = Saturday.

mod expander;
mod interleave;

pub use expander::expand_dates;
pub use interleave::interleave_week;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

/// Weekday number of a date (0 = Sunday).
#[inline]
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// A validated, non-empty set of weekdays in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(Vec<u8>);

impl WeekdaySet {
    /// Validates and normalizes a weekday list (sorted, deduplicated).
    ///
    /// # Errors
    /// `EmptyWeekdaySet` for an empty list, `InvalidWeekday` for values
    /// outside 0..=6.
    pub fn new(days: impl IntoIterator<Item = u8>) -> Result<Self, ValidationError> {
        let mut days: Vec<u8> = days.into_iter().collect();
        if days.is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::EmptyWeekdaySet,
                "at least one weekday must be selected",
            ));
        }
        if let Some(bad) = days.iter().find(|&&d| d > 6) {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidWeekday,
                format!("weekday {bad} is outside 0 (Sunday) ..= 6 (Saturday)"),
            ));
        }
        days.sort_unstable();
        days.dedup();
        Ok(Self(days))
    }

    /// Monday to Friday.
    pub fn weekdays() -> Self {
        Self(vec![1, 2, 3, 4, 5])
    }

    /// Default spread for a number of study days per week.
    ///
    /// | Days | Weekdays |
    /// |------|----------|
    /// | 5+ | Mon Tue Wed Thu Fri |
    /// | 4 | Mon Tue Thu Fri |
    /// | 3 | Mon Wed Fri |
    /// | 2 | Mon Thu |
    /// | 1 or less | Mon |
    pub fn from_study_days(days_per_week: i32) -> Self {
        let days = match days_per_week {
            d if d >= 5 => vec![1, 2, 3, 4, 5],
            4 => vec![1, 2, 4, 5],
            3 => vec![1, 3, 5],
            2 => vec![1, 4],
            _ => vec![1],
        };
        Self(days)
    }

    /// Weekday numbers in ascending order.
    pub fn days(&self) -> &[u8] {
        &self.0
    }

    /// Whether a weekday is selected.
    pub fn contains(&self, day: u8) -> bool {
        self.0.contains(&day)
    }

    /// Number of selected weekdays.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no weekday is selected. Never true for a validated set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for WeekdaySet {
    fn default() -> Self {
        Self::weekdays()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = ValidationError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let set = WeekdaySet::new([5, 1, 3, 1]).unwrap();
        assert_eq!(set.days(), &[1, 3, 5]);
        assert!(set.contains(3));
        assert!(!set.contains(0));
    }

    #[test]
    fn test_rejections() {
        let empty = WeekdaySet::new([]).unwrap_err();
        assert_eq!(empty.kind, ValidationErrorKind::EmptyWeekdaySet);
        let bad = WeekdaySet::new([1, 7]).unwrap_err();
        assert_eq!(bad.kind, ValidationErrorKind::InvalidWeekday);
    }

    #[test]
    fn test_from_study_days() {
        assert_eq!(WeekdaySet::from_study_days(7).days(), &[1, 2, 3, 4, 5]);
        assert_eq!(WeekdaySet::from_study_days(4).days(), &[1, 2, 4, 5]);
        assert_eq!(WeekdaySet::from_study_days(3).days(), &[1, 3, 5]);
        assert_eq!(WeekdaySet::from_study_days(2).days(), &[1, 4]);
        assert_eq!(WeekdaySet::from_study_days(1).days(), &[1]);
        assert_eq!(WeekdaySet::from_study_days(0).days(), &[1]);
    }

    #[test]
    fn test_serde_validates() {
        let set: WeekdaySet = serde_json::from_str("[3, 1]").unwrap();
        assert_eq!(set.days(), &[1, 3]);
        assert!(serde_json::from_str::<WeekdaySet>("[]").is_err());
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1,3]");
    }

    #[test]
    fn test_weekday_number() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!(weekday_number(sunday), 0);
        assert_eq!(weekday_number(sunday.succ_opt().unwrap()), 1);
    }
}
