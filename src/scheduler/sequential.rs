//! Sequential-by-subject allocation.
//!
//! Every subject appears in every working week, presenting one track at a
//! time. A subject's current track only changes in the guarantee pass,
//! once the track has no forward lesson left, so all items of a subject
//! within a week share a track (a subject-level review repeat after the
//! last track is the single item of its week).
//!
//! Quota and credit are kept per subject. Each track keeps its own review
//! pool; the subject pool (last lessons across all tracks, in track order)
//! is used only once every track is exhausted.

use std::collections::HashMap;

use super::{credit_covers, ReviewPool, WeekFill};
use crate::error::{PlanError, PlanResult};
use crate::models::{Allocation, CostedLesson, WeekWindow};

struct TrackCursor<'a> {
    name: &'a str,
    lessons: Vec<&'a CostedLesson>,
    cursor: usize,
    review: ReviewPool<'a>,
}

impl<'a> TrackCursor<'a> {
    fn next(&self) -> Option<&'a CostedLesson> {
        self.lessons.get(self.cursor).copied()
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.lessons.len()
    }
}

struct SubjectState<'a> {
    name: &'a str,
    tracks: Vec<TrackCursor<'a>>,
    current: usize,
    quota: f64,
    credit: f64,
    review: ReviewPool<'a>,
}

impl<'a> SubjectState<'a> {
    /// Moves the current track past exhausted ones.
    fn skip_exhausted(&mut self) {
        while self
            .tracks
            .get(self.current)
            .is_some_and(TrackCursor::is_exhausted)
        {
            self.current += 1;
        }
    }
}

/// Orders a subject's tracks: by preference rank when a preference list
/// is given (unlisted tracks last, relative order kept), otherwise by
/// name.
fn order_tracks(tracks: &mut [TrackCursor<'_>], preference: Option<&[String]>) {
    match preference.filter(|p| !p.is_empty()) {
        Some(names) => {
            let rank: HashMap<&str, usize> = names
                .iter()
                .enumerate()
                .map(|(i, n)| (n.as_str(), i))
                .collect();
            tracks.sort_by_key(|t| rank.get(t.name).copied().unwrap_or(usize::MAX));
        }
        None => tracks.sort_by(|a, b| a.name.cmp(b.name)),
    }
}

fn build_subjects<'a>(
    lessons: &'a [CostedLesson],
    working_weeks: usize,
    preference: Option<&[String]>,
    pool_size: usize,
) -> Vec<SubjectState<'a>> {
    let mut subject_index: HashMap<&str, usize> = HashMap::new();
    let mut subjects: Vec<(SubjectState<'a>, HashMap<&'a str, usize>)> = Vec::new();

    for l in lessons {
        let s = *subject_index
            .entry(l.lesson.subject_id.as_str())
            .or_insert_with(|| {
                subjects.push((
                    SubjectState {
                        name: &l.lesson.subject_name,
                        tracks: Vec::new(),
                        current: 0,
                        quota: 0.0,
                        credit: 0.0,
                        review: ReviewPool::from_tail(std::iter::empty(), pool_size),
                    },
                    HashMap::new(),
                ));
                subjects.len() - 1
            });

        let (subject, track_index) = &mut subjects[s];
        let t = *track_index
            .entry(l.lesson.track_id.as_str())
            .or_insert_with(|| {
                subject.tracks.push(TrackCursor {
                    name: &l.lesson.track_name,
                    lessons: Vec::new(),
                    cursor: 0,
                    review: ReviewPool::from_tail(std::iter::empty(), pool_size),
                });
                subject.tracks.len() - 1
            });
        subject.tracks[t].lessons.push(l);
    }

    let mut subjects: Vec<SubjectState<'a>> = subjects.into_iter().map(|(s, _)| s).collect();
    subjects.sort_by(|a, b| a.name.cmp(b.name));

    for s in &mut subjects {
        order_tracks(&mut s.tracks, preference);
        for t in &mut s.tracks {
            t.review = ReviewPool::from_tail(t.lessons.iter().copied(), pool_size);
        }
        let all: Vec<&'a CostedLesson> = s
            .tracks
            .iter()
            .flat_map(|t| t.lessons.iter().copied())
            .collect();
        s.quota = all.iter().map(|l| l.cost).sum::<f64>() / working_weeks as f64;
        s.review = ReviewPool::from_tail(all, pool_size);
    }
    subjects
}

pub(super) fn allocate(
    lessons: &[CostedLesson],
    weeks: &[&WeekWindow],
    track_order: Option<&[String]>,
    pool_size: usize,
) -> PlanResult<Allocation> {
    let mut subjects = build_subjects(lessons, weeks.len(), track_order, pool_size);
    let mut allocation = Allocation::new();

    for week in weeks {
        let mut fill = WeekFill::new(week, &mut allocation);

        for s in &mut subjects {
            s.credit += s.quota;
        }

        // Guarantee: one item per subject.
        for s in &mut subjects {
            s.skip_exhausted();
            let chosen = match s.tracks.get_mut(s.current) {
                Some(track) => match track.next().filter(|l| fill.fits(l.cost)) {
                    Some(lesson) => {
                        track.cursor += 1;
                        Some((lesson, false))
                    }
                    None => track.review.pick(fill.remaining).map(|l| (l, true)),
                },
                None => s.review.pick(fill.remaining).map(|l| (l, true)),
            };
            let Some((lesson, review)) = chosen else {
                return Err(PlanError::invariant(format!(
                    "cannot guarantee weekly presence of subject '{}' in week {}",
                    s.name, week.index
                )));
            };
            fill.place(lesson, review);
            s.credit -= lesson.cost;
        }

        // Fill by credit, current track only.
        let mut progressed = true;
        while progressed && fill.has_room() {
            progressed = false;
            for s in &mut subjects {
                let credit = s.credit;
                let Some(track) = s.tracks.get_mut(s.current) else {
                    continue;
                };
                let Some(next) = track.next() else { continue };
                if !fill.fits(next.cost) || !credit_covers(credit, next.cost) {
                    continue;
                }
                fill.place(next, false);
                track.cursor += 1;
                s.credit -= next.cost;
                progressed = true;
                if !fill.has_room() {
                    break;
                }
            }
        }
    }

    allocation.unplaced = subjects
        .iter()
        .flat_map(|s| s.tracks.iter())
        .flat_map(|t| t.lessons[t.cursor..].iter().map(|l| l.id().to_string()))
        .collect();
    Ok(allocation)
}
