//! Lesson allocation and utilization reporting.
//!
//! Places costed lessons into week windows under one of two fairness
//! disciplines, and measures how much of each week a plan uses.
//!
//! # Algorithm
//!
//! Both strategies run two passes per working week:
//!
//! 1. **Guarantee pass**: every group (track in parallel mode, subject in
//!    sequential mode) places exactly one item. The next forward lesson is
//!    preferred; if it does not fit, an item is drawn from the group's
//!    [`ReviewPool`]. If nothing fits the engine fails with
//!    [`PlanError::InternalInvariant`].
//! 2. **Fill pass**: groups take further forward lessons, round after
//!    round, while the lesson fits the remaining week capacity and the
//!    group's credit covers it.
//!
//! Each group earns `quota = group cost / working weeks` of credit at the
//! start of every week and pays the cost of each item it places. Credit
//! may go negative, which lets early weeks borrow against later ones.
//!
//! The engine relies on lessons arriving in catalog order (see
//! [`sort_lessons`](crate::models::sort_lessons)) and never re-sorts them.
//! Output is deterministic for identical input.
//!
//! # Reporting
//!
//! [`PlanStatistics`] recomputes per-week used minutes from stored plan
//! items and completion state.

mod parallel;
mod review;
mod sequential;
mod utilization;

pub use review::ReviewPool;
pub use utilization::{PlanStatistics, StatisticsSummary, WeekStatistics};

use tracing::{debug, warn};

use crate::config::{PlannerConfig, REVIEW_POOL_SIZE};
use crate::error::{PlanError, PlanResult};
use crate::models::{Allocation, Assignment, CostedLesson, Modality, WeekWindow};

/// Week-level lesson allocator.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use study_schedule::models::{CostModel, Lesson, Modality, StudyCalendar};
/// use study_schedule::scheduler::AllocationEngine;
///
/// let d = |day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
/// let weeks = StudyCalendar::new(d(3), d(16))
///     .with_daily_hours(2.0)
///     .with_weekly_days(5)
///     .weeks();
/// let lessons = CostModel::new(1.0).unwrap().apply(
///     (1..=3)
///         .map(|n| {
///             Lesson::new(format!("L{n}"))
///                 .with_subject("S1", "Math")
///                 .with_track("T1", "Algebra")
///                 .with_number(n)
///                 .with_duration(10.0)
///         })
///         .collect(),
/// );
///
/// let allocation = AllocationEngine::new()
///     .allocate(&lessons, &weeks, Modality::Parallel, None)
///     .unwrap();
/// assert!(allocation.is_complete());
/// assert!(!allocation.assignments_for_week(2).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    review_pool_size: usize,
}

impl AllocationEngine {
    /// Creates an engine with the default review pool size.
    pub fn new() -> Self {
        Self {
            review_pool_size: REVIEW_POOL_SIZE,
        }
    }

    /// Creates an engine using the configured review pool size.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new().with_review_pool_size(config.review_pool_size)
    }

    /// Sets the review pool size (at least 1).
    pub fn with_review_pool_size(mut self, size: usize) -> Self {
        self.review_pool_size = size.max(1);
        self
    }

    /// Allocates lessons to the working weeks.
    ///
    /// # Arguments
    /// * `lessons` - Costed lessons in catalog order.
    /// * `weeks` - All week windows; break weeks are skipped.
    /// * `modality` - Fairness discipline.
    /// * `track_order` - Preferred track names (sequential mode only).
    ///
    /// # Errors
    /// [`PlanError::InternalInvariant`] if a weekly guarantee cannot be
    /// met or there is no working week.
    pub fn allocate(
        &self,
        lessons: &[CostedLesson],
        weeks: &[WeekWindow],
        modality: Modality,
        track_order: Option<&[String]>,
    ) -> PlanResult<Allocation> {
        let working: Vec<&WeekWindow> = weeks.iter().filter(|w| w.is_working()).collect();
        if lessons.is_empty() {
            return Ok(Allocation::new());
        }
        if working.is_empty() {
            return Err(PlanError::invariant("allocation requires a working week"));
        }

        let allocation = match modality {
            Modality::Parallel => parallel::allocate(lessons, &working, self.review_pool_size)?,
            Modality::Sequential => {
                sequential::allocate(lessons, &working, track_order, self.review_pool_size)?
            }
        };

        debug!(
            %modality,
            lessons = lessons.len(),
            working_weeks = working.len(),
            assignments = allocation.assignment_count(),
            reviews = allocation.review_count(),
            "allocation finished"
        );
        if !allocation.is_complete() {
            warn!(
                %modality,
                unplaced = allocation.unplaced.len(),
                "some lessons could not be placed"
            );
        }

        Ok(allocation)
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Placement state of the week being filled.
struct WeekFill<'a> {
    week_index: u32,
    remaining: f64,
    next_order: u32,
    allocation: &'a mut Allocation,
}

impl<'a> WeekFill<'a> {
    fn new(week: &WeekWindow, allocation: &'a mut Allocation) -> Self {
        Self {
            week_index: week.index,
            remaining: week.capacity_minutes,
            next_order: 1,
            allocation,
        }
    }

    #[inline]
    fn fits(&self, cost: f64) -> bool {
        cost <= self.remaining
    }

    #[inline]
    fn has_room(&self) -> bool {
        self.remaining > 0.0
    }

    fn place(&mut self, lesson: &CostedLesson, review: bool) {
        let mut assignment = Assignment::new(lesson.id(), self.week_index, self.next_order);
        assignment.review = review;
        self.allocation.add_assignment(assignment);
        self.remaining -= lesson.cost;
        self.next_order += 1;
    }
}

/// Whether a group's credit covers a lesson.
#[inline]
fn credit_covers(credit: f64, cost: f64) -> bool {
    cost <= credit
}
