//! Plan service: orchestration over the catalog, completion and storage
//! ports.
//!
//! # Generation Pipeline
//!
//! 1. Validate the request
//! 2. Load and normalize catalog rows, drop completed lessons
//! 3. Sort once by catalog key, attach costs
//! 4. Build week windows, check feasibility
//! 5. Allocate lessons to weeks
//! 6. Replace the student's previous plan, store header and items
//!    (the header is removed again if item insertion fails)
//! 7. Store the default weekday preference and expand dates
//!
//! Steps 1 to 5 are pure; nothing is written before they succeed. A
//! failure in step 7 is logged and leaves the plan without dates.

mod batch;
mod memory;
mod ports;

pub use batch::{
    write_dates_in_batches, DateUpdateFailure, DateUpdateReport, PartialPersistenceWarning,
};
pub use memory::InMemoryStore;
pub use ports::{CatalogProvider, CompletionStore, PersistenceSink};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::error::{PlanError, PlanResult};
use crate::models::{
    normalize_rows, sort_lessons, CostModel, CostedLesson, Lesson, NewPlanItem, PlanItem,
    PlanRecord, PlanRequest, PlanSummary, WeekWindowsExt, WeekdayPreference,
};
use crate::scheduler::{AllocationEngine, PlanStatistics};
use crate::validation::{
    validate_feasibility, validate_request, ValidationError, ValidationErrorKind,
};
use crate::weekdays::{expand_dates, WeekdaySet};

/// Result of a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlan {
    /// Stored plan header.
    pub plan: PlanRecord,
    pub summary: PlanSummary,
    /// Outcome of the initial date pass; `None` if it failed.
    pub dates: Option<DateUpdateReport>,
}

/// Generates, re-dates and reports on study plans.
pub struct PlanService {
    catalog: Arc<dyn CatalogProvider>,
    completions: Arc<dyn CompletionStore>,
    sink: Arc<dyn PersistenceSink>,
    config: PlannerConfig,
    engine: AllocationEngine,
}

impl PlanService {
    /// Creates a service with the default configuration.
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        completions: Arc<dyn CompletionStore>,
        sink: Arc<dyn PersistenceSink>,
    ) -> Self {
        let config = PlannerConfig::default();
        Self {
            catalog,
            completions,
            sink,
            engine: AllocationEngine::from_config(&config),
            config,
        }
    }

    /// Creates a service backed by one store implementing every port.
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: CatalogProvider + CompletionStore + PersistenceSink + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> PlanResult<Self> {
        config.validate()?;
        self.engine = AllocationEngine::from_config(&config);
        self.config = config;
        Ok(self)
    }

    /// Active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Generates and stores a plan, replacing the student's previous one.
    ///
    /// # Errors
    /// - `Validation` for malformed input or when every lesson is filtered out
    /// - `Catalog` when the filters select nothing
    /// - `InsufficientCapacity` when the lessons do not fit
    /// - `InternalInvariant` when allocation breaks a weekly guarantee
    /// - `Conflict` / `Persistence` from storage
    pub async fn generate_plan(&self, request: &PlanRequest) -> PlanResult<GeneratedPlan> {
        if let Err(errors) = validate_request(request) {
            debug!(count = errors.len(), "plan request rejected");
            return Err(first_error(errors));
        }
        let cost_model = CostModel::from_config(request.playback_speed, &self.config)?;

        let filter = request.lesson_filter();
        let rows = self.catalog.load_lessons(&filter).await?;
        let mut lessons = normalize_rows(rows)?;

        let completed = match (request.exclude_completed, request.course_id.as_deref()) {
            (true, Some(course)) => {
                self.completions
                    .completed_lessons(&request.student_id, course)
                    .await?
            }
            _ => HashSet::new(),
        };
        if !completed.is_empty() {
            let before = lessons.len();
            lessons.retain(|l| !completed.contains(&l.id));
            debug!(excluded = before - lessons.len(), "completed lessons excluded");
        }
        if lessons.is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::NoLessonsAfterFilters,
                "every selected lesson is already completed",
            )
            .into());
        }
        sort_lessons(&mut lessons);

        let tracks_without_lessons = self.tracks_without_lessons(request, &lessons).await?;

        let costed = cost_model.apply(lessons);
        let weeks = request.calendar().weeks();
        let feasibility = validate_feasibility(
            request.modality,
            &costed,
            &weeks,
            request.daily_hours,
            request.weekly_days,
        )?;
        let allocation = self.engine.allocate(
            &costed,
            &weeks,
            request.modality,
            request.track_order.as_deref(),
        )?;

        let by_id: HashMap<&str, &CostedLesson> = costed.iter().map(|l| (l.id(), l)).collect();
        let new_items = allocation
            .assignments
            .iter()
            .map(|a| {
                by_id
                    .get(a.lesson_id.as_str())
                    .map(|lesson| NewPlanItem::from_assignment(a, lesson))
                    .ok_or_else(|| {
                        PlanError::invariant(format!("assigned unknown lesson '{}'", a.lesson_id))
                    })
            })
            .collect::<PlanResult<Vec<_>>>()?;

        let removed = self
            .sink
            .delete_plans_for_student(&request.student_id)
            .await?;
        if removed > 0 {
            info!(student = %request.student_id, removed, "previous plans deleted");
        }
        let plan = self.sink.create_plan(request).await?;

        let stored = match self.sink.insert_items(&plan.id, new_items).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(plan = %plan.id, error = %e, "item insertion failed, rolling back plan");
                if let Err(rollback) = self.sink.delete_plan(&plan.id).await {
                    warn!(plan = %plan.id, error = %rollback, "plan rollback failed");
                }
                return Err(e);
            }
        };

        let weekdays = WeekdaySet::from_study_days(request.weekly_days);
        let dates = match self.store_default_dates(&plan, &stored, &weekdays).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(plan = %plan.id, error = %e, "initial date assignment failed");
                None
            }
        };

        let tracks_covered = costed
            .iter()
            .map(|l| l.lesson.track_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let summary = PlanSummary {
            lesson_count: costed.len(),
            week_count: weeks.len(),
            working_week_count: weeks.working_count(),
            total_capacity_minutes: feasibility.total_capacity_minutes,
            total_cost_minutes: feasibility.total_cost_minutes,
            tracks_covered,
            assignment_count: stored.len(),
            review_count: allocation.review_count(),
            unplaced_lessons: allocation.unplaced,
            tracks_without_lessons,
        };
        info!(
            plan = %plan.id,
            student = %plan.student_id,
            lessons = summary.lesson_count,
            weeks = summary.week_count,
            items = summary.assignment_count,
            "plan generated"
        );

        Ok(GeneratedPlan {
            plan,
            summary,
            dates,
        })
    }

    /// Stores a new weekday selection for a plan and re-dates its items.
    ///
    /// Lesson, week and order of every item are left untouched.
    pub async fn update_weekdays(
        &self,
        plan_id: &str,
        student_id: &str,
        weekdays: &[u8],
    ) -> PlanResult<DateUpdateReport> {
        let set = WeekdaySet::new(weekdays.iter().copied())?;
        let plan = self.owned_plan(plan_id, student_id).await?;

        self.sink
            .upsert_weekday_preference(WeekdayPreference {
                plan_id: plan.id.clone(),
                weekdays: set.days().to_vec(),
            })
            .await?;
        let items = self.sink.load_plan_items(&plan.id).await?;
        let report = self.write_dates(&plan, &items, &set).await?;
        info!(
            plan = %plan.id,
            weekdays = ?set.days(),
            updated = report.updated,
            "weekdays updated"
        );
        Ok(report)
    }

    /// Stored weekday preference of a plan.
    pub async fn get_weekday_preference(
        &self,
        plan_id: &str,
        student_id: &str,
    ) -> PlanResult<Option<WeekdayPreference>> {
        let plan = self.owned_plan(plan_id, student_id).await?;
        self.sink.find_weekday_preference(&plan.id).await
    }

    /// Re-dates a plan with its stored weekday preference, or the
    /// configured default when none is stored.
    pub async fn recompute_dates(
        &self,
        plan_id: &str,
        student_id: &str,
    ) -> PlanResult<DateUpdateReport> {
        let plan = self.owned_plan(plan_id, student_id).await?;
        let set = match self.sink.find_weekday_preference(&plan.id).await? {
            Some(pref) => WeekdaySet::new(pref.weekdays)?,
            None => WeekdaySet::new(self.config.default_weekdays.iter().copied())?,
        };
        let items = self.sink.load_plan_items(&plan.id).await?;
        self.write_dates(&plan, &items, &set).await
    }

    /// Weekly utilization of a plan at its current playback speed and
    /// completion state.
    pub async fn plan_statistics(
        &self,
        plan_id: &str,
        student_id: &str,
    ) -> PlanResult<PlanStatistics> {
        let plan = self.owned_plan(plan_id, student_id).await?;
        let cost_model = CostModel::from_config(plan.playback_speed, &self.config)?;
        let weeks = plan.calendar().weeks();
        let items = self.sink.load_plan_items(&plan.id).await?;
        let completed = self.completions.completed_items(&plan.id).await?;

        let stats = PlanStatistics::calculate(&weeks, &items, &completed, &cost_model);
        debug!(
            plan = %plan.id,
            overloaded = stats.summary.overloaded_weeks,
            "statistics computed"
        );
        Ok(stats)
    }

    async fn owned_plan(&self, plan_id: &str, student_id: &str) -> PlanResult<PlanRecord> {
        let plan = self.sink.find_plan(plan_id).await?.ok_or_else(|| {
            ValidationError::new(
                ValidationErrorKind::PlanNotFound,
                format!("plan '{plan_id}' not found"),
            )
        })?;
        if plan.student_id != student_id {
            return Err(ValidationError::new(
                ValidationErrorKind::NotPlanOwner,
                format!("plan '{plan_id}' does not belong to this student"),
            )
            .into());
        }
        Ok(plan)
    }

    async fn tracks_without_lessons(
        &self,
        request: &PlanRequest,
        lessons: &[Lesson],
    ) -> PlanResult<Vec<String>> {
        let expected = self
            .catalog
            .expected_tracks(&request.subject_ids, request.course_id.as_deref())
            .await?;
        let present: HashSet<&str> = lessons.iter().map(|l| l.track_id.as_str()).collect();
        let missing: Vec<String> = expected
            .into_iter()
            .filter(|t| !present.contains(t.id.as_str()))
            .map(|t| format!("{} / {}", t.subject_name, t.name))
            .collect();
        if !missing.is_empty() {
            warn!(
                expected = present.len() + missing.len(),
                missing = missing.len(),
                "selected subjects have tracks without lessons"
            );
        }
        Ok(missing)
    }

    async fn store_default_dates(
        &self,
        plan: &PlanRecord,
        items: &[PlanItem],
        weekdays: &WeekdaySet,
    ) -> PlanResult<DateUpdateReport> {
        self.sink
            .upsert_weekday_preference(WeekdayPreference {
                plan_id: plan.id.clone(),
                weekdays: weekdays.days().to_vec(),
            })
            .await?;
        self.write_dates(plan, items, weekdays).await
    }

    async fn write_dates(
        &self,
        plan: &PlanRecord,
        items: &[PlanItem],
        weekdays: &WeekdaySet,
    ) -> PlanResult<DateUpdateReport> {
        let dated = expand_dates(plan.start, plan.end, items, weekdays);
        write_dates_in_batches(
            self.sink.as_ref(),
            &dated,
            self.config.update_batch_size,
            self.config.min_update_success_rate,
        )
        .await
    }
}

fn first_error(errors: Vec<ValidationError>) -> PlanError {
    errors.into_iter().next().map_or_else(
        || PlanError::invariant("validation failed without errors"),
        PlanError::Validation,
    )
}
