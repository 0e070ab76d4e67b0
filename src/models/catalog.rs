//! Catalog boundary types.
//!
//! Storage layers return lessons with their module, track and subject
//! joined in as optional nested records. [`CatalogRow`] models that shape
//! and is normalized into the strict [`Lesson`] before anything else sees
//! it.

use serde::{Deserialize, Serialize};

use super::Lesson;
use crate::error::CatalogError;

/// Subject reference attached to a catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectRef {
    pub id: String,
    pub name: String,
}

/// Track reference attached to a catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackRef {
    pub id: String,
    pub name: String,
    pub subject: Option<SubjectRef>,
}

/// Module reference attached to a catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleRef {
    pub id: String,
    pub name: String,
    pub number: Option<i32>,
    pub track: Option<TrackRef>,
}

/// A lesson row as delivered by a catalog provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRow {
    pub id: String,
    pub name: String,
    pub lesson_number: Option<i32>,
    pub estimated_minutes: Option<f64>,
    pub priority: Option<i32>,
    pub module: Option<ModuleRef>,
}

impl TryFrom<CatalogRow> for Lesson {
    type Error = CatalogError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        let missing = |level: &str| CatalogError::IncompleteRow {
            lesson_id: row.id.clone(),
            level: level.to_string(),
        };
        let module = row.module.as_ref().ok_or_else(|| missing("module"))?;
        let track = module.track.as_ref().ok_or_else(|| missing("track"))?;
        let subject = track.subject.as_ref().ok_or_else(|| missing("subject"))?;

        Ok(Lesson {
            id: row.id.clone(),
            name: row.name.clone(),
            subject_id: subject.id.clone(),
            subject_name: subject.name.clone(),
            track_id: track.id.clone(),
            track_name: track.name.clone(),
            module_id: module.id.clone(),
            module_number: module.number,
            lesson_number: row.lesson_number,
            raw_duration_minutes: row.estimated_minutes,
            priority: row.priority.unwrap_or(0),
        })
    }
}

/// Normalizes a batch of rows, failing on the first incomplete one.
pub fn normalize_rows(rows: Vec<CatalogRow>) -> Result<Vec<Lesson>, CatalogError> {
    rows.into_iter().map(Lesson::try_from).collect()
}

/// Lesson selection criteria passed to a catalog provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LessonFilter {
    /// Subjects to include.
    pub subject_ids: Vec<String>,
    /// Restricts tracks to one course.
    pub course_id: Option<String>,
    /// Restricts modules to this subset.
    pub module_ids: Option<Vec<String>>,
    /// Minimum priority requested by the caller.
    pub min_priority: i32,
}

impl LessonFilter {
    /// Creates a filter for the given subjects.
    pub fn new(subject_ids: Vec<String>) -> Self {
        Self {
            subject_ids,
            ..Default::default()
        }
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

    /// Priority threshold actually applied: never below 1.
    pub fn effective_min_priority(&self) -> i32 {
        self.min_priority.max(1)
    }

    /// Whether a lesson priority passes the filter. Priority 0 never does.
    pub fn accepts_priority(&self, priority: i32) -> bool {
        priority != 0 && priority >= self.effective_min_priority()
    }

    /// Whether a module passes the optional subset.
    pub fn accepts_module(&self, module_id: &str) -> bool {
        match &self.module_ids {
            Some(ids) if !ids.is_empty() => ids.iter().any(|m| m == module_id),
            _ => true,
        }
    }
}

/// A track of a selected subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: String,
    pub name: String,
    pub subject_id: String,
    pub subject_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> CatalogRow {
        CatalogRow {
            id: "L1".into(),
            name: "Intro".into(),
            lesson_number: Some(1),
            estimated_minutes: Some(12.0),
            priority: Some(3),
            module: Some(ModuleRef {
                id: "M1".into(),
                name: "Module 1".into(),
                number: Some(1),
                track: Some(TrackRef {
                    id: "T1".into(),
                    name: "Front A".into(),
                    subject: Some(SubjectRef {
                        id: "S1".into(),
                        name: "Math".into(),
                    }),
                }),
            }),
        }
    }

    #[test]
    fn test_row_normalization() {
        let lesson = Lesson::try_from(full_row()).unwrap();
        assert_eq!(lesson.subject_name, "Math");
        assert_eq!(lesson.track_id, "T1");
        assert_eq!(lesson.module_number, Some(1));
        assert_eq!(lesson.raw_duration_minutes, Some(12.0));
        assert_eq!(lesson.priority, 3);
    }

    #[test]
    fn test_incomplete_row_rejected() {
        let mut row = full_row();
        if let Some(m) = row.module.as_mut() {
            if let Some(t) = m.track.as_mut() {
                t.subject = None;
            }
        }
        let err = Lesson::try_from(row).unwrap_err();
        assert_eq!(
            err,
            CatalogError::IncompleteRow {
                lesson_id: "L1".into(),
                level: "subject".into()
            }
        );
    }

    #[test]
    fn test_normalize_rows_fails_fast() {
        let mut bad = full_row();
        bad.id = "L2".into();
        bad.module = None;
        assert!(normalize_rows(vec![full_row(), bad]).is_err());
        assert_eq!(normalize_rows(vec![full_row()]).unwrap().len(), 1);
    }

    #[test]
    fn test_priority_filter() {
        let f = LessonFilter::new(vec!["S1".into()]).with_min_priority(0);
        assert_eq!(f.effective_min_priority(), 1);
        assert!(!f.accepts_priority(0));
        assert!(f.accepts_priority(1));

        let strict = LessonFilter::new(vec![]).with_min_priority(3);
        assert!(!strict.accepts_priority(2));
        assert!(strict.accepts_priority(3));
    }

    #[test]
    fn test_module_filter() {
        let all = LessonFilter::new(vec![]);
        assert!(all.accepts_module("anything"));
        let empty_subset = LessonFilter::new(vec![]).with_modules(vec![]);
        assert!(empty_subset.accepts_module("anything"));
        let subset = LessonFilter::new(vec![]).with_modules(vec!["M1".into()]);
        assert!(subset.accepts_module("M1"));
        assert!(!subset.accepts_module("M2"));
    }
}
