//! Collaborator interfaces of the plan service.
//!
//! Storage, catalog queries and completion tracking live outside this
//! crate. The service talks to them only through these traits.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::PlanResult;
use crate::models::{
    CatalogRow, LessonFilter, NewPlanItem, PlanItem, PlanRecord, PlanRequest, TrackInfo,
    WeekdayPreference,
};

/// Source of the Subject → Track → Module → Lesson graph.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Loads the lesson rows selected by a filter.
    ///
    /// # Errors
    /// A [`CatalogError`](crate::error::CatalogError) naming the first
    /// filter level (tracks, modules, lessons) that selected nothing.
    async fn load_lessons(&self, filter: &LessonFilter) -> PlanResult<Vec<CatalogRow>>;

    /// All tracks of the given subjects, optionally scoped to a course.
    async fn expected_tracks(
        &self,
        subject_ids: &[String],
        course_id: Option<&str>,
    ) -> PlanResult<Vec<TrackInfo>>;
}

/// Completion state of lessons and plan items.
#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// IDs of lessons the student completed within a course.
    async fn completed_lessons(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> PlanResult<HashSet<String>>;

    /// IDs of the completed items of a plan.
    async fn completed_items(&self, plan_id: &str) -> PlanResult<HashSet<String>>;
}

/// Storage of plans, plan items and weekday preferences.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Creates a plan header.
    ///
    /// # Errors
    /// [`PlanError::Conflict`](crate::error::PlanError::Conflict) on a
    /// uniqueness or concurrency conflict.
    async fn create_plan(&self, request: &PlanRequest) -> PlanResult<PlanRecord>;

    /// Stores all items of a plan, returning them with their storage IDs
    /// in input order.
    async fn insert_items(&self, plan_id: &str, items: Vec<NewPlanItem>)
        -> PlanResult<Vec<PlanItem>>;

    /// Deletes a plan with its items and weekday preference.
    async fn delete_plan(&self, plan_id: &str) -> PlanResult<()>;

    /// Deletes every plan of a student. Returns the number removed.
    async fn delete_plans_for_student(&self, student_id: &str) -> PlanResult<usize>;

    /// Looks up a plan header.
    async fn find_plan(&self, plan_id: &str) -> PlanResult<Option<PlanRecord>>;

    /// Items of a plan.
    async fn load_plan_items(&self, plan_id: &str) -> PlanResult<Vec<PlanItem>>;

    /// Sets the calendar date of one item.
    async fn update_item_date(&self, item_id: &str, date: NaiveDate) -> PlanResult<()>;

    /// Creates or replaces the weekday preference of a plan.
    async fn upsert_weekday_preference(&self, preference: WeekdayPreference) -> PlanResult<()>;

    /// Stored weekday preference of a plan.
    async fn find_weekday_preference(&self, plan_id: &str)
        -> PlanResult<Option<WeekdayPreference>>;
}
