//! In-memory implementation of every collaborator port.
//!
//! Backs the integration tests and small embedded setups. Failures can be
//! injected per operation to exercise rollback and partial-write paths.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use super::{CatalogProvider, CompletionStore, PersistenceSink};
use crate::error::{CatalogError, PlanError, PlanResult};
use crate::models::{
    CatalogRow, LessonFilter, NewPlanItem, PlanItem, PlanRecord, PlanRequest, TrackInfo,
    WeekdayPreference,
};

#[derive(Debug, Default)]
struct State {
    rows: Vec<CatalogRow>,
    tracks: Vec<TrackInfo>,
    track_courses: HashMap<String, String>,
    completed_lessons: HashMap<(String, String), HashSet<String>>,
    completed_items: HashSet<String>,
    plans: BTreeMap<String, PlanRecord>,
    items: BTreeMap<String, Vec<PlanItem>>,
    preferences: HashMap<String, WeekdayPreference>,
    next_plan: u64,
    next_item: u64,
    date_updates: usize,
    failing_dates: HashSet<String>,
    fail_inserts: bool,
    conflict_on_create: bool,
}

impl State {
    fn find_item_mut(&mut self, item_id: &str) -> Option<&mut PlanItem> {
        self.items
            .values_mut()
            .flat_map(|items| items.iter_mut())
            .find(|i| i.id == item_id)
    }

    fn track_in_scope(
        &self,
        track: &TrackInfo,
        subject_ids: &[String],
        course: Option<&str>,
    ) -> bool {
        subject_ids.contains(&track.subject_id)
            && course.map_or(true, |c| {
                self.track_courses.get(&track.id).map(String::as_str) == Some(c)
            })
    }
}

/// Thread-safe in-memory catalog, completion store and plan storage.
///
/// Each student may hold at most one plan; creating a second one without
/// deleting the first is reported as a conflict.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds catalog rows. Tracks referenced by the rows are registered
    /// automatically.
    pub fn add_rows(&self, rows: impl IntoIterator<Item = CatalogRow>) {
        let mut state = self.state.write();
        for row in rows {
            let track = row.module.as_ref().and_then(|m| m.track.as_ref());
            if let Some(track) = track {
                if let Some(subject) = &track.subject {
                    if !state.tracks.iter().any(|t| t.id == track.id) {
                        state.tracks.push(TrackInfo {
                            id: track.id.clone(),
                            name: track.name.clone(),
                            subject_id: subject.id.clone(),
                            subject_name: subject.name.clone(),
                        });
                    }
                }
            }
            state.rows.push(row);
        }
    }

    /// Registers a track, typically one without lessons.
    pub fn add_track(&self, track: TrackInfo) {
        let mut state = self.state.write();
        if !state.tracks.iter().any(|t| t.id == track.id) {
            state.tracks.push(track);
        }
    }

    /// Assigns a track to a course.
    pub fn set_track_course(&self, track_id: impl Into<String>, course_id: impl Into<String>) {
        self.state
            .write()
            .track_courses
            .insert(track_id.into(), course_id.into());
    }

    /// Marks lessons completed by a student within a course.
    pub fn complete_lessons<I, S>(&self, student_id: &str, course_id: &str, lesson_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .write()
            .completed_lessons
            .entry((student_id.to_string(), course_id.to_string()))
            .or_default()
            .extend(lesson_ids.into_iter().map(Into::into));
    }

    /// Marks plan items completed.
    pub fn complete_items<I, S>(&self, item_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .write()
            .completed_items
            .extend(item_ids.into_iter().map(Into::into));
    }

    /// Makes date updates of these items fail.
    pub fn fail_date_updates_for<I, S>(&self, item_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .write()
            .failing_dates
            .extend(item_ids.into_iter().map(Into::into));
    }

    /// Makes item insertion fail.
    pub fn fail_item_inserts(&self, fail: bool) {
        self.state.write().fail_inserts = fail;
    }

    /// Makes plan creation report a conflict.
    pub fn conflict_on_create(&self, conflict: bool) {
        self.state.write().conflict_on_create = conflict;
    }

    /// Number of stored plans.
    pub fn plan_count(&self) -> usize {
        self.state.read().plans.len()
    }

    /// Plans of a student.
    pub fn plans_of(&self, student_id: &str) -> Vec<PlanRecord> {
        self.state
            .read()
            .plans
            .values()
            .filter(|p| p.student_id == student_id)
            .cloned()
            .collect()
    }

    /// Items of a plan, in insertion order.
    pub fn items_of(&self, plan_id: &str) -> Vec<PlanItem> {
        self.state
            .read()
            .items
            .get(plan_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Successful date updates so far.
    pub fn date_update_count(&self) -> usize {
        self.state.read().date_updates
    }
}

#[async_trait]
impl CatalogProvider for InMemoryStore {
    async fn load_lessons(&self, filter: &LessonFilter) -> PlanResult<Vec<CatalogRow>> {
        let state = self.state.read();

        let track_ids: HashSet<&str> = state
            .tracks
            .iter()
            .filter(|t| state.track_in_scope(t, &filter.subject_ids, filter.course_id.as_deref()))
            .map(|t| t.id.as_str())
            .collect();
        if track_ids.is_empty() {
            return Err(CatalogError::NoTracksFound.into());
        }

        let in_modules: Vec<&CatalogRow> = state
            .rows
            .iter()
            .filter(|row| {
                row.module.as_ref().is_some_and(|m| {
                    filter.accepts_module(&m.id)
                        && m.track
                            .as_ref()
                            .is_some_and(|t| track_ids.contains(t.id.as_str()))
                })
            })
            .collect();
        if in_modules.is_empty() {
            return Err(CatalogError::NoModulesFound.into());
        }

        let rows: Vec<CatalogRow> = in_modules
            .into_iter()
            .filter(|row| filter.accepts_priority(row.priority.unwrap_or(0)))
            .cloned()
            .collect();
        if rows.is_empty() {
            return Err(CatalogError::NoLessonsFound.into());
        }
        Ok(rows)
    }

    async fn expected_tracks(
        &self,
        subject_ids: &[String],
        course_id: Option<&str>,
    ) -> PlanResult<Vec<TrackInfo>> {
        let state = self.state.read();
        Ok(state
            .tracks
            .iter()
            .filter(|t| state.track_in_scope(t, subject_ids, course_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CompletionStore for InMemoryStore {
    async fn completed_lessons(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> PlanResult<HashSet<String>> {
        Ok(self
            .state
            .read()
            .completed_lessons
            .get(&(student_id.to_string(), course_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn completed_items(&self, plan_id: &str) -> PlanResult<HashSet<String>> {
        let state = self.state.read();
        Ok(state
            .items
            .get(plan_id)
            .into_iter()
            .flatten()
            .filter(|i| state.completed_items.contains(&i.id))
            .map(|i| i.id.clone())
            .collect())
    }
}

#[async_trait]
impl PersistenceSink for InMemoryStore {
    async fn create_plan(&self, request: &PlanRequest) -> PlanResult<PlanRecord> {
        let mut state = self.state.write();
        if state.conflict_on_create {
            return Err(PlanError::conflict("plan creation conflicted"));
        }
        if state.plans.values().any(|p| p.student_id == request.student_id) {
            return Err(PlanError::conflict(format!(
                "student '{}' already has a plan",
                request.student_id
            )));
        }
        state.next_plan += 1;
        let record = PlanRecord::from_request(format!("plan-{}", state.next_plan), request);
        state.plans.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn insert_items(
        &self,
        plan_id: &str,
        items: Vec<NewPlanItem>,
    ) -> PlanResult<Vec<PlanItem>> {
        let mut state = self.state.write();
        if state.fail_inserts {
            return Err(PlanError::persistence("item insertion failed"));
        }
        if !state.plans.contains_key(plan_id) {
            return Err(PlanError::persistence(format!("plan '{plan_id}' not found")));
        }
        let first = state.next_item;
        state.next_item += items.len() as u64;
        let stored: Vec<PlanItem> = items
            .into_iter()
            .zip(first + 1..)
            .map(|(item, n)| PlanItem::from_new(format!("item-{n}"), item))
            .collect();
        state
            .items
            .entry(plan_id.to_string())
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn delete_plan(&self, plan_id: &str) -> PlanResult<()> {
        let mut state = self.state.write();
        state.plans.remove(plan_id);
        state.items.remove(plan_id);
        state.preferences.remove(plan_id);
        Ok(())
    }

    async fn delete_plans_for_student(&self, student_id: &str) -> PlanResult<usize> {
        let mut state = self.state.write();
        let ids: Vec<String> = state
            .plans
            .values()
            .filter(|p| p.student_id == student_id)
            .map(|p| p.id.clone())
            .collect();
        for id in &ids {
            state.plans.remove(id);
            state.items.remove(id);
            state.preferences.remove(id);
        }
        Ok(ids.len())
    }

    async fn find_plan(&self, plan_id: &str) -> PlanResult<Option<PlanRecord>> {
        Ok(self.state.read().plans.get(plan_id).cloned())
    }

    async fn load_plan_items(&self, plan_id: &str) -> PlanResult<Vec<PlanItem>> {
        Ok(self.items_of(plan_id))
    }

    async fn update_item_date(&self, item_id: &str, date: NaiveDate) -> PlanResult<()> {
        let mut state = self.state.write();
        if state.failing_dates.contains(item_id) {
            return Err(PlanError::persistence(format!(
                "date update of '{item_id}' failed"
            )));
        }
        let item = state
            .find_item_mut(item_id)
            .ok_or_else(|| PlanError::persistence(format!("item '{item_id}' not found")))?;
        item.scheduled_date = Some(date);
        state.date_updates += 1;
        Ok(())
    }

    async fn upsert_weekday_preference(&self, preference: WeekdayPreference) -> PlanResult<()> {
        self.state
            .write()
            .preferences
            .insert(preference.plan_id.clone(), preference);
        Ok(())
    }

    async fn find_weekday_preference(
        &self,
        plan_id: &str,
    ) -> PlanResult<Option<WeekdayPreference>> {
        Ok(self.state.read().preferences.get(plan_id).cloned())
    }
}
