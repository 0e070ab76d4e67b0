//! Parallel-by-track allocation.
//!
//! Every track appears in every working week. Tracks are visited in
//! (subject name, track name) order; lessons inside a track keep catalog
//! order.

use std::collections::HashMap;

use super::{credit_covers, ReviewPool, WeekFill};
use crate::error::{PlanError, PlanResult};
use crate::models::{Allocation, CostedLesson, WeekWindow};

/// Allocation state of one track.
struct TrackState<'a> {
    name: &'a str,
    subject_name: &'a str,
    lessons: Vec<&'a CostedLesson>,
    cursor: usize,
    quota: f64,
    credit: f64,
    review: ReviewPool<'a>,
}

impl<'a> TrackState<'a> {
    fn next(&self) -> Option<&'a CostedLesson> {
        self.lessons.get(self.cursor).copied()
    }

    fn total_cost(&self) -> f64 {
        self.lessons.iter().map(|l| l.cost).sum()
    }
}

/// Groups lessons by track, keeping first-appearance order, then sorts
/// tracks by subject and track name.
fn build_tracks<'a>(
    lessons: &'a [CostedLesson],
    working_weeks: usize,
    pool_size: usize,
) -> Vec<TrackState<'a>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tracks: Vec<TrackState<'a>> = Vec::new();

    for l in lessons {
        let slot = *index.entry(l.lesson.track_id.as_str()).or_insert_with(|| {
            tracks.push(TrackState {
                name: &l.lesson.track_name,
                subject_name: &l.lesson.subject_name,
                lessons: Vec::new(),
                cursor: 0,
                quota: 0.0,
                credit: 0.0,
                review: ReviewPool::from_tail(std::iter::empty(), pool_size),
            });
            tracks.len() - 1
        });
        tracks[slot].lessons.push(l);
    }

    tracks.sort_by(|a, b| {
        a.subject_name
            .cmp(b.subject_name)
            .then_with(|| a.name.cmp(b.name))
    });

    for t in &mut tracks {
        t.quota = t.total_cost() / working_weeks as f64;
        t.review = ReviewPool::from_tail(t.lessons.iter().copied(), pool_size);
    }
    tracks
}

pub(super) fn allocate(
    lessons: &[CostedLesson],
    weeks: &[&WeekWindow],
    pool_size: usize,
) -> PlanResult<Allocation> {
    let mut tracks = build_tracks(lessons, weeks.len(), pool_size);
    let mut allocation = Allocation::new();

    for week in weeks {
        let mut fill = WeekFill::new(week, &mut allocation);

        for t in &mut tracks {
            t.credit += t.quota;
        }

        // Guarantee: one item per track.
        for t in &mut tracks {
            let chosen = match t.next().filter(|l| fill.fits(l.cost)) {
                Some(lesson) => {
                    t.cursor += 1;
                    Some((lesson, false))
                }
                None => t.review.pick(fill.remaining).map(|l| (l, true)),
            };
            let Some((lesson, review)) = chosen else {
                return Err(PlanError::invariant(format!(
                    "cannot guarantee weekly presence of track '{}' in week {}",
                    t.name, week.index
                )));
            };
            fill.place(lesson, review);
            t.credit -= lesson.cost;
        }

        // Fill by credit.
        let mut progressed = true;
        while progressed && fill.has_room() {
            progressed = false;
            for t in &mut tracks {
                let Some(next) = t.next() else { continue };
                if !fill.fits(next.cost) || !credit_covers(t.credit, next.cost) {
                    continue;
                }
                fill.place(next, false);
                t.credit -= next.cost;
                t.cursor += 1;
                progressed = true;
                if !fill.has_room() {
                    break;
                }
            }
        }
    }

    allocation.unplaced = tracks
        .iter()
        .flat_map(|t| t.lessons[t.cursor..].iter().map(|l| l.id().to_string()))
        .collect();
    Ok(allocation)
}
