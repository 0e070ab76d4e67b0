//! Lesson model and cost model.
//!
//! A lesson is the atomic unit of study content. Lessons belong to a
//! module, a track and a subject (Subject → Track → Module → Lesson).
//!
//! # Cost
//! The effective cost of a lesson is the lecture time adjusted by the
//! playback speed, plus companion study time proportional to it:
//!
//! ```text
//! cost = (raw_minutes ?? default_minutes) / playback_speed * study_factor
//! ```
//!
//! Costs are computed once per generation or report and carried on
//! [`CostedLesson`]; downstream code never re-derives them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::{PlannerConfig, DEFAULT_LESSON_MINUTES, STUDY_FACTOR};
use crate::validation::{ValidationError, ValidationErrorKind};

/// A lesson from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning subject.
    pub subject_id: String,
    /// Subject display name (catalog sort key).
    pub subject_name: String,
    /// Owning track.
    pub track_id: String,
    /// Track display name (catalog sort key).
    pub track_name: String,
    /// Owning module.
    pub module_id: String,
    /// Module position within the track.
    pub module_number: Option<i32>,
    /// Lesson position within the module.
    pub lesson_number: Option<i32>,
    /// Estimated lecture duration (minutes). `None` = unknown.
    pub raw_duration_minutes: Option<f64>,
    /// Priority score (higher = more important).
    pub priority: i32,
}

impl Lesson {
    /// Creates a lesson with the given ID and empty placement.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subject_id: String::new(),
            subject_name: String::new(),
            track_id: String::new(),
            track_name: String::new(),
            module_id: String::new(),
            module_number: None,
            lesson_number: None,
            raw_duration_minutes: None,
            priority: 1,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Places the lesson in a subject.
    pub fn with_subject(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.subject_id = id.into();
        self.subject_name = name.into();
        self
    }

    /// Places the lesson in a track.
    pub fn with_track(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.track_id = id.into();
        self.track_name = name.into();
        self
    }

    /// Places the lesson in a module.
    pub fn with_module(mut self, id: impl Into<String>, number: Option<i32>) -> Self {
        self.module_id = id.into();
        self.module_number = number;
        self
    }

    /// Sets the lesson number within its module.
    pub fn with_number(mut self, number: i32) -> Self {
        self.lesson_number = Some(number);
        self
    }

    /// Sets the estimated duration (minutes).
    pub fn with_duration(mut self, minutes: f64) -> Self {
        self.raw_duration_minutes = Some(minutes);
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Catalog order: subject name, track name, module number, lesson
    /// number. Missing numbers sort as zero.
    pub fn catalog_cmp(&self, other: &Self) -> Ordering {
        self.subject_name
            .cmp(&other.subject_name)
            .then_with(|| self.track_name.cmp(&other.track_name))
            .then_with(|| {
                self.module_number
                    .unwrap_or(0)
                    .cmp(&other.module_number.unwrap_or(0))
            })
            .then_with(|| {
                self.lesson_number
                    .unwrap_or(0)
                    .cmp(&other.lesson_number.unwrap_or(0))
            })
    }
}

/// Sorts lessons into catalog order.
///
/// This is the only place lesson order is established; the allocation
/// engine relies on it and never re-sorts. The sort is stable.
pub fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by(Lesson::catalog_cmp);
}

/// A lesson with its effective cost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostedLesson {
    /// The catalog lesson.
    pub lesson: Lesson,
    /// Effective study minutes.
    pub cost: f64,
}

impl CostedLesson {
    /// Lesson ID.
    #[inline]
    pub fn id(&self) -> &str {
        &self.lesson.id
    }
}

/// Converts raw lesson durations into effective study cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    playback_speed: f64,
    default_minutes: f64,
    study_factor: f64,
}

impl CostModel {
    /// Creates a cost model with the default constants.
    ///
    /// `playback_speed` must be finite and positive.
    pub fn new(playback_speed: f64) -> Result<Self, ValidationError> {
        Self::with_constants(playback_speed, DEFAULT_LESSON_MINUTES, STUDY_FACTOR)
    }

    /// Creates a cost model using the constants from a configuration.
    pub fn from_config(
        playback_speed: f64,
        config: &PlannerConfig,
    ) -> Result<Self, ValidationError> {
        Self::with_constants(
            playback_speed,
            config.default_lesson_minutes,
            config.study_factor,
        )
    }

    fn with_constants(
        playback_speed: f64,
        default_minutes: f64,
        study_factor: f64,
    ) -> Result<Self, ValidationError> {
        if !(playback_speed.is_finite() && playback_speed > 0.0) {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidPlaybackSpeed,
                format!("playback speed must be positive, got {playback_speed}"),
            ));
        }
        Ok(Self {
            playback_speed,
            default_minutes,
            study_factor,
        })
    }

    /// Playback speed multiplier.
    pub fn playback_speed(&self) -> f64 {
        self.playback_speed
    }

    /// Effective cost of a raw duration (minutes).
    #[inline]
    pub fn cost_of(&self, raw_minutes: Option<f64>) -> f64 {
        raw_minutes.unwrap_or(self.default_minutes) / self.playback_speed * self.study_factor
    }

    /// Effective cost of a lesson (minutes).
    #[inline]
    pub fn cost(&self, lesson: &Lesson) -> f64 {
        self.cost_of(lesson.raw_duration_minutes)
    }

    /// Attaches costs to lessons, preserving order.
    pub fn apply(&self, lessons: Vec<Lesson>) -> Vec<CostedLesson> {
        lessons
            .into_iter()
            .map(|lesson| CostedLesson {
                cost: self.cost(&lesson),
                lesson,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_builder() {
        let l = Lesson::new("L1")
            .with_name("Kinematics")
            .with_subject("S1", "Physics")
            .with_track("T1", "Front A")
            .with_module("M1", Some(2))
            .with_number(3)
            .with_duration(20.0)
            .with_priority(4);
        assert_eq!(l.subject_name, "Physics");
        assert_eq!(l.track_id, "T1");
        assert_eq!(l.module_number, Some(2));
        assert_eq!(l.lesson_number, Some(3));
        assert_eq!(l.raw_duration_minutes, Some(20.0));
        assert_eq!(l.priority, 4);
    }

    #[test]
    fn test_cost_formula() {
        let model = CostModel::new(1.0).unwrap();
        assert!((model.cost_of(Some(10.0)) - 15.0).abs() < 1e-12);
        // Missing duration defaults to 10 minutes.
        assert!((model.cost_of(None) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_playback_speed_scales_cost() {
        let fast = CostModel::new(2.0).unwrap();
        assert!((fast.cost_of(Some(20.0)) - 15.0).abs() < 1e-12);
        let slow = CostModel::new(0.5).unwrap();
        assert!((slow.cost_of(Some(20.0)) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_speed_rejected() {
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = CostModel::new(speed).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidPlaybackSpeed);
        }
    }

    #[test]
    fn test_config_constants() {
        let cfg = PlannerConfig {
            default_lesson_minutes: 20.0,
            study_factor: 2.0,
            ..PlannerConfig::default()
        };
        let model = CostModel::from_config(1.0, &cfg).unwrap();
        assert!((model.cost_of(None) - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_catalog_sort() {
        let numbered = |id: &str, subject: (&str, &str), track: (&str, &str), number| {
            Lesson::new(id)
                .with_subject(subject.0, subject.1)
                .with_track(track.0, track.1)
                .with_module("M", Some(1))
                .with_number(number)
        };
        let mut lessons = vec![
            numbered("b2", ("S2", "Biology"), ("T", "A"), 2),
            numbered("p1", ("S1", "Physics"), ("T", "A"), 1),
            numbered("b1", ("S2", "Biology"), ("T", "A"), 1),
            Lesson::new("b0")
                .with_subject("S2", "Biology")
                .with_track("T", "A")
                .with_module("M0", None),
            numbered("ba", ("S2", "Biology"), ("T2", "B"), 1),
        ];
        sort_lessons(&mut lessons);
        let ids: Vec<&str> = lessons.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b0", "b1", "b2", "ba", "p1"]);
    }

    #[test]
    fn test_apply_preserves_order() {
        let model = CostModel::new(1.0).unwrap();
        let costed = model.apply(vec![
            Lesson::new("a").with_duration(10.0),
            Lesson::new("b").with_duration(40.0),
        ]);
        assert_eq!(costed[0].id(), "a");
        assert!((costed[1].cost - 60.0).abs() < 1e-12);
    }
}
