//! Plan request, stored plan and plan item models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Assignment, BreakPeriod, CostedLesson, LessonFilter, Modality, StudyCalendar};

/// Name given to plans created without one.
pub const DEFAULT_PLAN_NAME: &str = "My Study Plan";

/// Inputs of a plan generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Student the plan is generated for.
    pub student_id: String,
    /// Display name.
    pub name: Option<String>,
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
    /// Minimum lesson priority.
    pub min_priority: i32,
    /// Subjects to study.
    pub subject_ids: Vec<String>,
    /// Optional course scope.
    pub course_id: Option<String>,
    /// Optional module subset.
    pub module_ids: Option<Vec<String>>,
    /// Fairness discipline.
    pub modality: Modality,
    /// Track names in preferred order (sequential mode).
    pub track_order: Option<Vec<String>>,
    /// Playback speed multiplier.
    pub playback_speed: f64,
    /// Skip lessons the student already completed.
    pub exclude_completed: bool,
}

impl PlanRequest {
    /// Creates a request with defaults: parallel, speed 1.0, completed
    /// lessons excluded, priority 1, no breaks.
    pub fn new(student_id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            student_id: student_id.into(),
            name: None,
            start,
            end,
            breaks: Vec::new(),
            daily_hours: 0.0,
            weekly_days: 0,
            min_priority: 1,
            subject_ids: Vec::new(),
            course_id: None,
            module_ids: None,
            modality: Modality::Parallel,
            track_order: None,
            playback_speed: 1.0,
            exclude_completed: true,
        }
    }

    /// Sets the plan name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets daily hours and weekly study days.
    pub fn with_study_time(mut self, daily_hours: f64, weekly_days: i32) -> Self {
        self.daily_hours = daily_hours;
        self.weekly_days = weekly_days;
        self
    }

    /// Adds a break period.
    pub fn with_break(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.breaks.push(BreakPeriod::new(start, end));
        self
    }

    /// Sets the subjects.
    pub fn with_subjects<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subject_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the course scope.
    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    /// Sets the module subset.
    pub fn with_modules(mut self, module_ids: Vec<String>) -> Self {
        self.module_ids = Some(module_ids);
        self
    }

    /// Sets the minimum priority.
    pub fn with_min_priority(mut self, priority: i32) -> Self {
        self.min_priority = priority;
        self
    }

    /// Sets the modality.
    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    /// Sets the preferred track order.
    pub fn with_track_order(mut self, names: Vec<String>) -> Self {
        self.track_order = Some(names);
        self
    }

    /// Sets the playback speed.
    pub fn with_playback_speed(mut self, speed: f64) -> Self {
        self.playback_speed = speed;
        self
    }

    /// Sets whether completed lessons are skipped.
    pub fn with_exclude_completed(mut self, exclude: bool) -> Self {
        self.exclude_completed = exclude;
        self
    }

    /// Capacity calendar for this request.
    pub fn calendar(&self) -> StudyCalendar {
        StudyCalendar::new(self.start, self.end)
            .with_daily_hours(self.daily_hours)
            .with_weekly_days(self.weekly_days)
            .with_breaks(self.breaks.iter().copied())
    }

    /// Catalog filter for this request.
    pub fn lesson_filter(&self) -> LessonFilter {
        LessonFilter {
            subject_ids: self.subject_ids.clone(),
            course_id: self.course_id.clone(),
            module_ids: self.module_ids.clone().filter(|m| !m.is_empty()),
            min_priority: self.min_priority,
        }
    }
}

/// A stored plan header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanRecord {
    pub id: String,
    pub student_id: String,
    pub name: String,
    pub course_id: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub breaks: Vec<BreakPeriod>,
    pub daily_hours: f64,
    pub weekly_days: i32,
    /// Effective minimum priority (never below 1).
    pub min_priority: i32,
    pub modality: Modality,
    pub subject_ids: Vec<String>,
    pub track_order: Option<Vec<String>>,
    pub module_ids: Option<Vec<String>>,
    pub exclude_completed: bool,
    pub playback_speed: f64,
}

impl PlanRecord {
    /// Builds the header stored for a request.
    pub fn from_request(id: impl Into<String>, request: &PlanRequest) -> Self {
        Self {
            id: id.into(),
            student_id: request.student_id.clone(),
            name: request
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_PLAN_NAME.to_string()),
            course_id: request.course_id.clone(),
            start: request.start,
            end: request.end,
            breaks: request.breaks.clone(),
            daily_hours: request.daily_hours,
            weekly_days: request.weekly_days,
            min_priority: request.min_priority.max(1),
            modality: request.modality,
            subject_ids: request.subject_ids.clone(),
            track_order: request.track_order.clone(),
            module_ids: request.module_ids.clone().filter(|m| !m.is_empty()),
            exclude_completed: request.exclude_completed,
            playback_speed: request.playback_speed,
        }
    }

    /// Capacity calendar as configured at generation time.
    pub fn calendar(&self) -> StudyCalendar {
        StudyCalendar::new(self.start, self.end)
            .with_daily_hours(self.daily_hours)
            .with_weekly_days(self.weekly_days)
            .with_breaks(self.breaks.iter().copied())
    }
}

/// A plan item ready to be inserted.
///
/// Carries the lesson fields the weekday expander and the utilization
/// reporter need, so they never have to query the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPlanItem {
    pub lesson_id: String,
    pub week_index: u32,
    pub order_in_week: u32,
    pub review: bool,
    pub subject_name: String,
    pub track_name: String,
    pub raw_duration_minutes: Option<f64>,
}

impl NewPlanItem {
    /// Joins an assignment with its lesson.
    pub fn from_assignment(assignment: &Assignment, lesson: &CostedLesson) -> Self {
        Self {
            lesson_id: assignment.lesson_id.clone(),
            week_index: assignment.week_index,
            order_in_week: assignment.order_in_week,
            review: assignment.review,
            subject_name: lesson.lesson.subject_name.clone(),
            track_name: lesson.lesson.track_name.clone(),
            raw_duration_minutes: lesson.lesson.raw_duration_minutes,
        }
    }
}

/// A stored plan item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanItem {
    /// Storage ID of the item.
    pub id: String,
    pub lesson_id: String,
    pub week_index: u32,
    pub order_in_week: u32,
    pub review: bool,
    pub subject_name: String,
    pub track_name: String,
    pub raw_duration_minutes: Option<f64>,
    /// Calendar date, once expanded.
    pub scheduled_date: Option<NaiveDate>,
}

impl PlanItem {
    /// Creates a stored item from an inserted one.
    pub fn from_new(id: impl Into<String>, item: NewPlanItem) -> Self {
        Self {
            id: id.into(),
            lesson_id: item.lesson_id,
            week_index: item.week_index,
            order_in_week: item.order_in_week,
            review: item.review,
            subject_name: item.subject_name,
            track_name: item.track_name,
            raw_duration_minutes: item.raw_duration_minutes,
            scheduled_date: None,
        }
    }
}

/// A plan item with its computed calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatedItem {
    pub item_id: String,
    pub lesson_id: String,
    pub week_index: u32,
    pub order_in_week: u32,
    pub date: NaiveDate,
}

/// Stored weekday preference of a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekdayPreference {
    pub plan_id: String,
    /// Weekdays, 0 = Sunday .. 6 = Saturday, ascending.
    pub weekdays: Vec<u8>,
}

/// Summary returned by plan generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    /// Lessons considered after filtering.
    pub lesson_count: usize,
    /// Weeks in the date range.
    pub week_count: usize,
    /// Weeks without breaks.
    pub working_week_count: usize,
    /// Capacity of the working weeks (minutes).
    pub total_capacity_minutes: f64,
    /// Cost of all lessons (minutes).
    pub total_cost_minutes: f64,
    /// Distinct tracks that received lessons.
    pub tracks_covered: usize,
    /// Stored assignments, including reviews.
    pub assignment_count: usize,
    /// Review repeats among the assignments.
    pub review_count: usize,
    /// Lessons the engine could not place.
    pub unplaced_lessons: Vec<String>,
    /// Tracks of the selected subjects with no lessons after filtering.
    pub tracks_without_lessons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let r = PlanRequest::new("student", d(3), d(16));
        assert_eq!(r.modality, Modality::Parallel);
        assert!(r.exclude_completed);
        assert!((r.playback_speed - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_request_filter_drops_empty_module_subset() {
        let r = PlanRequest::new("s", d(3), d(16))
            .with_subjects(["S1", "S2"])
            .with_modules(vec![])
            .with_min_priority(2);
        let f = r.lesson_filter();
        assert_eq!(f.subject_ids, vec!["S1".to_string(), "S2".to_string()]);
        assert!(f.module_ids.is_none());
        assert_eq!(f.min_priority, 2);
    }

    #[test]
    fn test_record_from_request() {
        let r = PlanRequest::new("s", d(3), d(16))
            .with_study_time(2.0, 5)
            .with_min_priority(0)
            .with_break(d(10), d(12));
        let rec = PlanRecord::from_request("p1", &r);
        assert_eq!(rec.name, DEFAULT_PLAN_NAME);
        assert_eq!(rec.min_priority, 1);
        let weeks = rec.calendar().weeks();
        assert_eq!(weeks.len(), 2);
        assert!(weeks[1].is_break);
    }
}
