//! Review pool with rotating pick.
//!
//! When a group's next forward lesson does not fit the week, the weekly
//! guarantee is met by repeating one of the group's last lessons.
//!
//! # Algorithm
//! 1. Scan the pool starting at the rotation cursor, wrapping around.
//!    Take the first lesson whose cost fits and move the cursor past it.
//! 2. If the scan finds nothing, take the cheapest lesson that fits and
//!    leave the cursor where it was.

use crate::models::CostedLesson;

/// Trailing lessons of a track or subject, with a rotation cursor.
#[derive(Debug, Clone)]
pub struct ReviewPool<'a> {
    lessons: Vec<&'a CostedLesson>,
    cursor: usize,
}

impl<'a> ReviewPool<'a> {
    /// Builds a pool from the last `size` lessons of a sequence.
    pub fn from_tail<I>(lessons: I, size: usize) -> Self
    where
        I: IntoIterator<Item = &'a CostedLesson>,
    {
        let all: Vec<&'a CostedLesson> = lessons.into_iter().collect();
        let skip = all.len().saturating_sub(size);
        Self {
            lessons: all.into_iter().skip(skip).collect(),
            cursor: 0,
        }
    }

    /// Number of lessons in the pool.
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Current rotation cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Picks a lesson costing at most `remaining` minutes.
    pub fn pick(&mut self, remaining: f64) -> Option<&'a CostedLesson> {
        let n = self.lessons.len();
        if n == 0 {
            return None;
        }

        for i in 0..n {
            let idx = (self.cursor + i) % n;
            let candidate = self.lessons[idx];
            if candidate.cost <= remaining {
                self.cursor = (idx + 1) % n;
                return Some(candidate);
            }
        }

        let mut sorted = self.lessons.clone();
        sorted.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        sorted.into_iter().find(|l| l.cost <= remaining)
    }
}
