//! Capacity calendar.
//!
//! Splits a plan's date range into 7-day week windows starting at the plan
//! start date, marks the windows touched by a break period, and assigns
//! each working week its study capacity in minutes.
//!
//! # Date Model
//! All dates are plain calendar dates (`NaiveDate`), inclusive at both
//! ends. No time-of-day or timezone is involved.
//!
//! # Precedence
//! A week overlapping any break period, even by a single day, is a break
//! week with zero capacity.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A break (vacation) period [start, end], inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreakPeriod {
    /// First day of the break.
    pub start: NaiveDate,
    /// Last day of the break.
    pub end: NaiveDate,
}

impl BreakPeriod {
    /// Creates a break period.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether a date falls within the break.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whether the break touches the window [start, end].
    ///
    /// True if the window starts or ends inside the break, or the window
    /// fully contains the break.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.contains(start) || self.contains(end) || (start <= self.start && end >= self.end)
    }
}

/// One week of the plan.
///
/// Immutable once computed; `capacity_minutes` is zero for break weeks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekWindow {
    /// 1-based week number.
    pub index: u32,
    /// First day of the week.
    pub start: NaiveDate,
    /// Last day of the week (clipped to the plan end).
    pub end: NaiveDate,
    /// Whether the week overlaps a break period.
    pub is_break: bool,
    /// Study minutes available in this week.
    pub capacity_minutes: f64,
}

impl WeekWindow {
    /// Whether a date falls inside this week.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whether study time can be allocated to this week.
    #[inline]
    pub fn is_working(&self) -> bool {
        !self.is_break
    }
}

/// Study availability for a plan.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use study_schedule::models::StudyCalendar;
///
/// let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
/// let weeks = StudyCalendar::new(d(3), d(16))
///     .with_daily_hours(2.0)
///     .with_weekly_days(5)
///     .weeks();
/// assert_eq!(weeks.len(), 2);
/// assert_eq!(weeks[0].capacity_minutes, 600.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyCalendar {
    /// First day of the plan.
    pub start: NaiveDate,
    /// Last day of the plan.
    pub end: NaiveDate,
    /// Periods without study.
    pub breaks: Vec<BreakPeriod>,
    /// Study hours per study day.
    pub daily_hours: f64,
    /// Study days per week.
    pub weekly_days: i32,
}

impl StudyCalendar {
    /// Creates a calendar with no study time configured.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            breaks: Vec::new(),
            daily_hours: 0.0,
            weekly_days: 0,
        }
    }

    /// Sets the daily study hours.
    pub fn with_daily_hours(mut self, hours: f64) -> Self {
        self.daily_hours = hours;
        self
    }

    /// Sets the number of study days per week.
    pub fn with_weekly_days(mut self, days: i32) -> Self {
        self.weekly_days = days;
        self
    }

    /// Adds a break period.
    pub fn with_break(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.breaks.push(BreakPeriod::new(start, end));
        self
    }

    /// Adds several break periods.
    pub fn with_breaks(mut self, breaks: impl IntoIterator<Item = BreakPeriod>) -> Self {
        self.breaks.extend(breaks);
        self
    }

    /// Capacity of a working week (minutes).
    ///
    /// Non-positive or non-finite inputs yield zero.
    pub fn weekly_capacity_minutes(&self) -> f64 {
        let minutes = self.daily_hours * f64::from(self.weekly_days) * 60.0;
        if self.daily_hours > 0.0 && self.weekly_days > 0 && minutes.is_finite() {
            minutes
        } else {
            0.0
        }
    }

    /// Whether the window [start, end] touches a break.
    pub fn is_break_window(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.breaks.iter().any(|b| b.overlaps(start, end))
    }

    /// Computes the ordered week windows of the plan.
    ///
    /// Windows step 7 days from `start`; the last one is clipped to `end`.
    /// Returns an empty list if `end < start`.
    pub fn weeks(&self) -> Vec<WeekWindow> {
        let capacity = self.weekly_capacity_minutes();
        let mut weeks = Vec::new();
        let mut week_start = self.start;
        let mut index = 1;

        while week_start <= self.end {
            let full_end = week_start + Duration::days(6);
            // The break test uses the unclipped 7-day window.
            let is_break = self.is_break_window(week_start, full_end);

            weeks.push(WeekWindow {
                index,
                start: week_start,
                end: full_end.min(self.end),
                is_break,
                capacity_minutes: if is_break { 0.0 } else { capacity },
            });

            week_start += Duration::days(7);
            index += 1;
        }

        weeks
    }
}

/// Aggregate queries over a week sequence.
pub trait WeekWindowsExt {
    /// Working (non-break) weeks in order.
    fn working(&self) -> Vec<&WeekWindow>;
    /// Number of working weeks.
    fn working_count(&self) -> usize;
    /// Sum of working-week capacities (minutes).
    fn total_capacity_minutes(&self) -> f64;
    /// Capacity of the tightest working week, `None` if there is none.
    fn min_working_capacity(&self) -> Option<f64>;
    /// Looks up a week by its 1-based index.
    fn week(&self, index: u32) -> Option<&WeekWindow>;
}

impl WeekWindowsExt for [WeekWindow] {
    fn working(&self) -> Vec<&WeekWindow> {
        self.iter().filter(|w| w.is_working()).collect()
    }

    fn working_count(&self) -> usize {
        self.iter().filter(|w| w.is_working()).count()
    }

    fn total_capacity_minutes(&self) -> f64 {
        self.iter()
            .filter(|w| w.is_working())
            .map(|w| w.capacity_minutes)
            .sum()
    }

    fn min_working_capacity(&self) -> Option<f64> {
        self.iter()
            .filter(|w| w.is_working())
            .map(|w| w.capacity_minutes)
            .reduce(f64::min)
    }

    fn week(&self, index: u32) -> Option<&WeekWindow> {
        self.iter().find(|w| w.index == index)
    }
}
