//! Input validation and feasibility checks for plan generation.
//!
//! Two layers run before any allocation:
//!
//! 1. **Structural checks** ([`validate_request`]): collect every problem
//!    with the request (missing student, inverted dates, bad breaks,
//!    invalid playback speed, no subjects) and report them all at once.
//! 2. **Feasibility checks** ([`validate_feasibility`]): given the costed
//!    lessons and the week windows, verify that
//!    - some working week has usable capacity,
//!    - total cost fits total working capacity,
//!    - the tightest working week can host the cheapest lesson of every
//!      group (track in parallel mode, subject in sequential mode).
//!
//! # Boundary
//! Both capacity comparisons are strict: a plan whose cost equals the
//! available capacity is feasible.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CapacityShortfall;
use crate::models::{CostedLesson, Modality, PlanRequest, WeekWindow, WeekWindowsExt};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// A required field is empty.
    MissingField,
    /// The plan end is not after the plan start.
    InvalidDateRange,
    /// Daily hours or weekly days are out of range.
    InvalidStudyDays,
    /// A break period ends before it starts.
    InvalidBreakPeriod,
    /// Playback speed is not a positive number.
    InvalidPlaybackSpeed,
    /// No subject was selected.
    EmptySubjects,
    /// No weekday was selected.
    EmptyWeekdaySet,
    /// A weekday is outside 0..=6.
    InvalidWeekday,
    /// The plan belongs to another student.
    NotPlanOwner,
    /// The plan does not exist.
    PlanNotFound,
    /// Every lesson was removed by the completion filter.
    NoLessonsAfterFilters,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the structure of a plan request.
///
/// Checks:
/// 1. Student ID is present
/// 2. End date is after start date
/// 3. Daily hours are a number no greater than 24, weekly days at most 7
/// 4. Every break period ends on or after its start
/// 5. Playback speed is finite and positive
/// 6. At least one subject is selected
///
/// Zero or negative study time is not rejected here; it produces zero
/// weekly capacity, which [`check_usable_capacity`] reports.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &PlanRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if request.student_id.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingField,
            "student_id is required",
        ));
    }

    if request.end <= request.start {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDateRange,
            format!(
                "end date {} must be after start date {}",
                request.end, request.start
            ),
        ));
    }

    if request.daily_hours.is_nan() || request.daily_hours > 24.0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidStudyDays,
            format!("daily hours must be at most 24, got {}", request.daily_hours),
        ));
    }
    if request.weekly_days > 7 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidStudyDays,
            format!("weekly days must be at most 7, got {}", request.weekly_days),
        ));
    }

    for b in &request.breaks {
        if b.end < b.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBreakPeriod,
                format!("break period {}..{} ends before it starts", b.start, b.end),
            ));
        }
    }

    if !(request.playback_speed.is_finite() && request.playback_speed > 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidPlaybackSpeed,
            format!(
                "playback speed must be positive, got {}",
                request.playback_speed
            ),
        ));
    }

    if request.subject_ids.iter().all(|s| s.trim().is_empty()) {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptySubjects,
            "at least one subject must be selected",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Figures established by a passing feasibility check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feasibility {
    /// Sum of all lesson costs (minutes).
    pub total_cost_minutes: f64,
    /// Sum of working-week capacities (minutes).
    pub total_capacity_minutes: f64,
    /// Capacity of the tightest working week (minutes).
    pub min_weekly_capacity_minutes: f64,
    /// Sum of the cheapest lesson per group (minutes).
    pub min_weekly_required_minutes: f64,
    /// Number of tracks (parallel) or subjects (sequential).
    pub group_count: usize,
}

/// Returns the tightest working-week capacity, or a shortfall if there
/// is no working week or it is not a positive number.
pub fn check_usable_capacity(weeks: &[WeekWindow]) -> Result<f64, CapacityShortfall> {
    match weeks.min_working_capacity() {
        Some(cap) if cap.is_finite() && cap > 0.0 => Ok(cap),
        Some(cap) => Err(CapacityShortfall::NoUsableCapacity {
            weekly_capacity_minutes: cap,
        }),
        None => Err(CapacityShortfall::NoUsableCapacity {
            weekly_capacity_minutes: 0.0,
        }),
    }
}

/// Checks that total lesson cost fits total working capacity.
///
/// `weekly_days` is used only to express the shortfall as daily hours.
pub fn check_total_capacity(
    lessons: &[CostedLesson],
    weeks: &[WeekWindow],
    daily_hours: f64,
    weekly_days: i32,
) -> Result<(), CapacityShortfall> {
    let total_cost: f64 = lessons.iter().map(|l| l.cost).sum();
    let total_capacity = weeks.total_capacity_minutes();

    if total_cost > total_capacity {
        let required_hours = total_cost / 60.0;
        let available_hours = total_capacity / 60.0;
        let study_days = weeks.working_count() as f64 * f64::from(weekly_days.max(1));
        let required_daily = required_hours / study_days;

        return Err(CapacityShortfall::Total {
            required_hours: required_hours.ceil(),
            available_hours: available_hours.ceil(),
            required_daily_hours: (required_daily * 10.0).ceil() / 10.0,
            current_daily_hours: daily_hours,
        });
    }
    Ok(())
}

/// Sum of the cheapest lesson cost per group, and the group count.
///
/// Groups are tracks in parallel mode and subjects in sequential mode.
pub fn minimum_weekly_presence(modality: Modality, lessons: &[CostedLesson]) -> (f64, usize) {
    let mut min_per_group: HashMap<&str, f64> = HashMap::new();
    for l in lessons {
        let key = match modality {
            Modality::Parallel => l.lesson.track_id.as_str(),
            Modality::Sequential => l.lesson.subject_id.as_str(),
        };
        min_per_group
            .entry(key)
            .and_modify(|m| {
                if l.cost < *m {
                    *m = l.cost;
                }
            })
            .or_insert(l.cost);
    }
    (min_per_group.values().sum(), min_per_group.len())
}

/// Checks that the tightest working week can host one item per group.
pub fn check_weekly_presence(
    modality: Modality,
    lessons: &[CostedLesson],
    min_weekly_capacity: f64,
) -> Result<(f64, usize), CapacityShortfall> {
    let (minimum, groups) = minimum_weekly_presence(modality, lessons);
    if minimum > min_weekly_capacity {
        return Err(CapacityShortfall::Weekly {
            modality,
            minimum_required_minutes: minimum.ceil(),
            weekly_capacity_minutes: min_weekly_capacity.floor(),
            group_count: groups,
        });
    }
    Ok((minimum, groups))
}

/// Runs every feasibility check in order: usable capacity, total
/// capacity, weekly presence.
pub fn validate_feasibility(
    modality: Modality,
    lessons: &[CostedLesson],
    weeks: &[WeekWindow],
    daily_hours: f64,
    weekly_days: i32,
) -> Result<Feasibility, CapacityShortfall> {
    let min_capacity = check_usable_capacity(weeks)?;
    check_total_capacity(lessons, weeks, daily_hours, weekly_days)?;
    let (min_required, group_count) = check_weekly_presence(modality, lessons, min_capacity)?;

    Ok(Feasibility {
        total_cost_minutes: lessons.iter().map(|l| l.cost).sum(),
        total_capacity_minutes: weeks.total_capacity_minutes(),
        min_weekly_capacity_minutes: min_capacity,
        min_weekly_required_minutes: min_required,
        group_count,
    })
}
