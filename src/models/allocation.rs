//! Allocation (solution) model.
//!
//! An allocation is the week-level output of the allocation engine: an
//! ordered list of lesson-to-week assignments. Calendar dates are added
//! later by the weekday expander.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fairness discipline used to allocate lessons to weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Every track appears every week.
    Parallel,
    /// Every subject appears every week, one active track at a time.
    Sequential,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => f.write_str("parallel"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// A lesson placed in a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned lesson ID.
    pub lesson_id: String,
    /// 1-based week index.
    pub week_index: u32,
    /// Dense 1-based allocation order within the week.
    pub order_in_week: u32,
    /// Whether this is a repeat drawn from a review pool.
    #[serde(default)]
    pub review: bool,
}

impl Assignment {
    /// Creates a forward (new content) assignment.
    pub fn new(lesson_id: impl Into<String>, week_index: u32, order_in_week: u32) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            week_index,
            order_in_week,
            review: false,
        }
    }

    /// Marks the assignment as a review repeat.
    pub fn as_review(mut self) -> Self {
        self.review = true;
        self
    }
}

/// Result of running the allocation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Allocation {
    /// Assignments in allocation order.
    pub assignments: Vec<Assignment>,
    /// Lessons the engine never reached (capacity or credit ran out).
    pub unplaced: Vec<String>,
}

impl Allocation {
    /// Creates an empty allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Number of review assignments.
    pub fn review_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.review).count()
    }

    /// Whether every lesson received a forward assignment.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    /// Assignments of one week, in order.
    pub fn assignments_for_week(&self, week_index: u32) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.week_index == week_index)
            .collect()
    }

    /// Assignments of one lesson (forward and review).
    pub fn assignments_for_lesson(&self, lesson_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.lesson_id == lesson_id)
            .collect()
    }

    /// Week in which a lesson is first taught, if any.
    pub fn forward_week_of(&self, lesson_id: &str) -> Option<u32> {
        self.assignments
            .iter()
            .find(|a| !a.review && a.lesson_id == lesson_id)
            .map(|a| a.week_index)
    }

    /// Assignment count per week.
    pub fn counts_by_week(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for a in &self.assignments {
            *counts.entry(a.week_index).or_insert(0) += 1;
        }
        counts
    }

    /// Minutes used per week, given lesson costs.
    pub fn minutes_by_week(&self, costs: &HashMap<&str, f64>) -> BTreeMap<u32, f64> {
        let mut used = BTreeMap::new();
        for a in &self.assignments {
            let cost = costs.get(a.lesson_id.as_str()).copied().unwrap_or(0.0);
            *used.entry(a.week_index).or_insert(0.0) += cost;
        }
        used
    }
}
