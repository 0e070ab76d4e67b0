//! Plan utilization metrics.
//!
//! Recomputes how much of each week's capacity a stored plan uses, given
//! the plan's current playback speed and completion state.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Used | Sum of item costs in the week |
//! | Available | max(0, capacity - used) |
//! | Used % | used / capacity * 100, 0 when capacity is 0 |
//! | Overloaded | Used % > 100 |
//! | Mean used % | Mean of used % over working weeks |
//!
//! Figures are computed in full precision and rounded to two decimals
//! when the report is built.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{CostModel, PlanItem, WeekWindow};

/// Utilization of one plan week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekStatistics {
    pub week_index: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub capacity_minutes: f64,
    pub used_minutes: f64,
    pub available_minutes: f64,
    pub used_percent: f64,
    pub is_break: bool,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub pending_lessons: usize,
}

impl WeekStatistics {
    /// Whether more time is scheduled than available.
    #[inline]
    pub fn is_overloaded(&self) -> bool {
        self.used_percent > 100.0
    }
}

/// Plan-level aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatisticsSummary {
    pub total_weeks: usize,
    pub working_weeks: usize,
    pub break_weeks: usize,
    /// Capacity of the working weeks.
    pub total_capacity_minutes: f64,
    pub total_used_minutes: f64,
    pub total_available_minutes: f64,
    /// Mean used percent over working weeks.
    pub mean_used_percent: f64,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub overloaded_weeks: usize,
}

/// Weekly utilization of a plan plus its summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanStatistics {
    pub weeks: Vec<WeekStatistics>,
    pub summary: StatisticsSummary,
}

impl PlanStatistics {
    /// Computes statistics for a plan.
    ///
    /// # Arguments
    /// * `weeks` - Week windows recomputed from the plan header.
    /// * `items` - Stored plan items.
    /// * `completed` - IDs of completed plan items.
    /// * `cost_model` - Cost model at the plan's current playback speed.
    pub fn calculate(
        weeks: &[WeekWindow],
        items: &[PlanItem],
        completed: &HashSet<String>,
        cost_model: &CostModel,
    ) -> Self {
        let mut by_week: HashMap<u32, Vec<&PlanItem>> = HashMap::new();
        for item in items {
            by_week.entry(item.week_index).or_default().push(item);
        }

        let mut stats = Vec::with_capacity(weeks.len());
        let mut summary = StatisticsSummary {
            total_weeks: weeks.len(),
            ..Default::default()
        };
        let mut percent_sum = 0.0;

        for week in weeks {
            let week_items = by_week.get(&week.index).map(Vec::as_slice).unwrap_or(&[]);

            let used: f64 = week_items
                .iter()
                .map(|i| cost_model.cost_of(i.raw_duration_minutes))
                .sum();
            let done = week_items
                .iter()
                .filter(|i| completed.contains(&i.id))
                .count();
            let capacity = week.capacity_minutes;
            let available = (capacity - used).max(0.0);
            let percent = if capacity > 0.0 {
                used / capacity * 100.0
            } else {
                0.0
            };

            if week.is_working() {
                summary.working_weeks += 1;
                summary.total_capacity_minutes += capacity;
                percent_sum += percent;
            }
            summary.total_used_minutes += used;
            summary.total_available_minutes += available;
            summary.total_lessons += week_items.len();
            summary.completed_lessons += done;

            let stat = WeekStatistics {
                week_index: week.index,
                start: week.start,
                end: week.end,
                capacity_minutes: capacity,
                used_minutes: round2(used),
                available_minutes: round2(available),
                used_percent: round2(percent),
                is_break: week.is_break,
                total_lessons: week_items.len(),
                completed_lessons: done,
                pending_lessons: week_items.len() - done,
            };
            if stat.is_overloaded() {
                summary.overloaded_weeks += 1;
            }
            stats.push(stat);
        }

        summary.break_weeks = summary.total_weeks - summary.working_weeks;
        summary.mean_used_percent = if summary.working_weeks > 0 {
            round2(percent_sum / summary.working_weeks as f64)
        } else {
            0.0
        };
        summary.total_capacity_minutes = round2(summary.total_capacity_minutes);
        summary.total_used_minutes = round2(summary.total_used_minutes);
        summary.total_available_minutes = round2(summary.total_available_minutes);

        Self {
            weeks: stats,
            summary,
        }
    }
}

#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
