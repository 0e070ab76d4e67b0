//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use study_schedule::models::{CatalogRow, ModuleRef, PlanItem, SubjectRef, TrackRef};
use study_schedule::service::{InMemoryStore, PlanService};

pub fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

/// A priority-1 lesson row in module 1 of `subject`/`track`.
///
/// Track IDs are `"{subject}/{track}"` so equal track names in different
/// subjects stay distinct.
pub fn lesson(id: &str, subject: &str, track: &str, number: i32, minutes: f64) -> CatalogRow {
    CatalogRow {
        id: id.into(),
        name: format!("Lesson {id}"),
        lesson_number: Some(number),
        estimated_minutes: Some(minutes),
        priority: Some(1),
        module: Some(ModuleRef {
            id: format!("{subject}/{track}/M1"),
            name: "Module 1".into(),
            number: Some(1),
            track: Some(TrackRef {
                id: format!("{subject}/{track}"),
                name: track.into(),
                subject: Some(SubjectRef {
                    id: subject.into(),
                    name: subject.into(),
                }),
            }),
        }),
    }
}

/// `count` lessons named `{prefix}1..` in one track.
pub fn track_lessons(
    prefix: &str,
    subject: &str,
    track: &str,
    count: i32,
    minutes: f64,
) -> Vec<CatalogRow> {
    (1..=count)
        .map(|n| lesson(&format!("{prefix}{n}"), subject, track, n, minutes))
        .collect()
}

pub fn service_with(rows: Vec<CatalogRow>) -> (Arc<InMemoryStore>, PlanService) {
    let store = Arc::new(InMemoryStore::new());
    store.add_rows(rows);
    let service = PlanService::with_store(store.clone());
    (store, service)
}

/// Identity of an item without its date.
pub fn identity(item: &PlanItem) -> (String, String, u32, u32, bool) {
    (
        item.id.clone(),
        item.lesson_id.clone(),
        item.week_index,
        item.order_in_week,
        item.review,
    )
}
