mod common;

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use common::{d, identity, service_with, track_lessons};
use study_schedule::error::PlanError;
use study_schedule::models::{PlanItem, PlanRequest};
use study_schedule::service::{InMemoryStore, PlanService};
use study_schedule::validation::ValidationErrorKind;
use study_schedule::weekdays::weekday_number;

/// One week (Mon 2025-03-03 .. Sun 03-09), three subjects with three
/// lessons each. Every lesson lands in week 1.
async fn nine_item_plan() -> (std::sync::Arc<InMemoryStore>, PlanService, String) {
    let mut rows = track_lessons("B", "Bio", "Core", 3, 10.0);
    rows.extend(track_lessons("C", "Chem", "Core", 3, 10.0));
    rows.extend(track_lessons("M", "Math", "Core", 3, 10.0));
    let (store, service) = service_with(rows);
    let request = PlanRequest::new("alice", d(3, 3), d(3, 9))
        .with_study_time(2.0, 5)
        .with_subjects(["Bio", "Chem", "Math"]);
    let generated = service.generate_plan(&request).await.unwrap();
    assert_eq!(generated.summary.assignment_count, 9);
    (store, service, generated.plan.id)
}

/// Two weeks, one track of 20 lessons, no reviews: items item-1..item-20.
async fn twenty_item_plan() -> (std::sync::Arc<InMemoryStore>, PlanService, String) {
    let (store, service) = service_with(track_lessons("L", "Math", "Algebra", 20, 10.0));
    let request = PlanRequest::new("alice", d(3, 3), d(3, 16))
        .with_study_time(2.0, 5)
        .with_subjects(["Math"]);
    let generated = service.generate_plan(&request).await.unwrap();
    assert_eq!(generated.summary.assignment_count, 20);
    (store, service, generated.plan.id)
}

fn dates(items: &[PlanItem]) -> HashMap<String, NaiveDate> {
    items
        .iter()
        .map(|i| (i.id.clone(), i.scheduled_date.unwrap()))
        .collect()
}

#[tokio::test]
async fn test_mon_wed_fri_split_three_ways() {
    let (store, service, plan_id) = nine_item_plan().await;

    let report = service
        .update_weekdays(&plan_id, "alice", &[5, 1, 3])
        .await
        .unwrap();
    assert_eq!(report.updated, 9);
    assert!(report.warning.is_none());

    let items = store.items_of(&plan_id);
    let mut per_day: BTreeMap<NaiveDate, Vec<&PlanItem>> = BTreeMap::new();
    for item in &items {
        per_day.entry(item.scheduled_date.unwrap()).or_default().push(item);
    }
    let days: Vec<NaiveDate> = per_day.keys().copied().collect();
    assert_eq!(days, vec![d(3, 3), d(3, 5), d(3, 7)]);
    assert!(per_day.values().all(|v| v.len() == 3));

    // Each day holds one lesson of every subject instead of a clump.
    for day_items in per_day.values() {
        let mut subjects: Vec<&str> = day_items.iter().map(|i| i.subject_name.as_str()).collect();
        subjects.sort_unstable();
        assert_eq!(subjects, vec!["Bio", "Chem", "Math"]);
    }

    let pref = service
        .get_weekday_preference(&plan_id, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pref.weekdays, vec![1, 3, 5]);
}

#[tokio::test]
async fn test_new_weekdays_move_dates_only() {
    let (store, service, plan_id) = nine_item_plan().await;
    let before = store.items_of(&plan_id);

    service
        .update_weekdays(&plan_id, "alice", &[2, 4])
        .await
        .unwrap();
    let after = store.items_of(&plan_id);

    let ids_before: Vec<_> = before.iter().map(identity).collect();
    let ids_after: Vec<_> = after.iter().map(identity).collect();
    assert_eq!(ids_before, ids_after);
    assert_ne!(dates(&before), dates(&after));
    assert!(after
        .iter()
        .all(|i| matches!(weekday_number(i.scheduled_date.unwrap()), 2 | 4)));
}

#[tokio::test]
async fn test_expansion_is_idempotent() {
    let (store, service, plan_id) = nine_item_plan().await;

    service
        .update_weekdays(&plan_id, "alice", &[0, 6])
        .await
        .unwrap();
    let first = dates(&store.items_of(&plan_id));
    service
        .update_weekdays(&plan_id, "alice", &[0, 6])
        .await
        .unwrap();
    assert_eq!(first, dates(&store.items_of(&plan_id)));

    // Recompute reuses the stored preference.
    service.recompute_dates(&plan_id, "alice").await.unwrap();
    assert_eq!(first, dates(&store.items_of(&plan_id)));
}

#[tokio::test]
async fn test_generation_dates_follow_study_days() {
    let (store, _, plan_id) = nine_item_plan().await;
    // Five study days per week default to Monday..Friday.
    assert!(store
        .items_of(&plan_id)
        .iter()
        .all(|i| (1..=5).contains(&weekday_number(i.scheduled_date.unwrap()))));
}

#[tokio::test]
async fn test_invalid_weekdays_rejected() {
    let (_, service, plan_id) = nine_item_plan().await;

    let err = service
        .update_weekdays(&plan_id, "alice", &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlanError::Validation(ref e) if e.kind == ValidationErrorKind::EmptyWeekdaySet
    ));

    let err = service
        .update_weekdays(&plan_id, "alice", &[1, 9])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlanError::Validation(ref e) if e.kind == ValidationErrorKind::InvalidWeekday
    ));
}

#[tokio::test]
async fn test_partial_write_above_threshold_warns() {
    let (store, service, plan_id) = twenty_item_plan().await;
    store.fail_date_updates_for(["item-4", "item-9"]);

    let report = service
        .update_weekdays(&plan_id, "alice", &[1, 3, 5])
        .await
        .unwrap();
    assert_eq!(report.attempted, 20);
    assert_eq!(report.updated, 18);
    let warning = report.warning.unwrap();
    assert_eq!(warning.failed, 2);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.item_id.as_str()).collect();
    assert!(failed.contains(&"item-4") && failed.contains(&"item-9"));
}

#[tokio::test]
async fn test_partial_write_below_threshold_fails() {
    let (store, service, plan_id) = twenty_item_plan().await;
    store.fail_date_updates_for(["item-1", "item-2", "item-3"]);

    let err = service
        .update_weekdays(&plan_id, "alice", &[1, 3, 5])
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Persistence { .. }));
}

#[tokio::test]
async fn test_date_failure_does_not_fail_generation() {
    let (store, service) = service_with(track_lessons("L", "Math", "Algebra", 20, 10.0));
    store.fail_date_updates_for((1..=5).map(|n| format!("item-{n}")));
    let request = PlanRequest::new("alice", d(3, 3), d(3, 16))
        .with_study_time(2.0, 5)
        .with_subjects(["Math"]);

    let generated = service.generate_plan(&request).await.unwrap();
    assert!(generated.dates.is_none());
    assert_eq!(store.items_of(&generated.plan.id).len(), 20);
}

#[tokio::test]
async fn test_plan_ending_mid_week_keeps_dates_in_range() {
    // Mon 2025-03-03 .. Tue 03-11: the second week is clipped to two days.
    let mut rows = track_lessons("B", "Bio", "Core", 30, 10.0);
    rows.extend(track_lessons("M", "Math", "Core", 30, 10.0));
    let (store, service) = service_with(rows);
    let request = PlanRequest::new("alice", d(3, 3), d(3, 11))
        .with_study_time(2.0, 5)
        .with_subjects(["Bio", "Math"]);

    let generated = service.generate_plan(&request).await.unwrap();
    assert_eq!(generated.summary.assignment_count, 60);
    assert!(generated.dates.is_some());

    let items = store.items_of(&generated.plan.id);
    assert!(items.iter().any(|i| i.week_index == 2));
    for item in &items {
        let date = item.scheduled_date.unwrap();
        assert!(date <= d(3, 11), "{} dated {date}", item.id);
        if item.week_index == 2 {
            assert!(date >= d(3, 10));
        }
    }
}
