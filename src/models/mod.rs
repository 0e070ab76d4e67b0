//! Study planning domain models.
//!
//! Provides the data types for representing a study plan problem and its
//! solution: the capacity calendar, the lesson catalog, the week-level
//! allocation and the stored plan.
//!
//! # Domain Mappings
//!
//! | study-schedule | Scheduling term | Description |
//! |----------------|-----------------|-------------|
//! | Lesson | Job | Atomic study content with a cost |
//! | Track | Job family | Ordered stream of lessons |
//! | WeekWindow | Time bucket | 7-day slot with capacity |
//! | Assignment | Assignment | Lesson placed in a week |
//! | Allocation | Schedule | All assignments of a plan |

mod allocation;
mod calendar;
mod catalog;
mod lesson;
mod plan;

pub use allocation::{Allocation, Assignment, Modality};
pub use calendar::{BreakPeriod, StudyCalendar, WeekWindow, WeekWindowsExt};
pub use catalog::{
    normalize_rows, CatalogRow, LessonFilter, ModuleRef, SubjectRef, TrackInfo, TrackRef,
};
pub use lesson::{sort_lessons, CostModel, CostedLesson, Lesson};
pub use plan::{
    DatedItem, NewPlanItem, PlanItem, PlanRecord, PlanRequest, PlanSummary, WeekdayPreference,
    DEFAULT_PLAN_NAME,
};
