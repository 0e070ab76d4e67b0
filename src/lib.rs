//! Study-plan scheduling.
//!
//! Allocates a catalog of lessons (Subject → Track → Module → Lesson) to the
//! weeks of a student's study period, then maps each week's lessons onto the
//! student's chosen weekdays.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `WeekWindow`, `Lesson`, `CostModel`,
//!   `Assignment`, `Allocation`, `PlanRequest`, `PlanItem`
//! - **`validation`**: Request checks and capacity feasibility
//! - **`scheduler`**: Parallel and sequential allocation strategies,
//!   utilization statistics
//! - **`weekdays`**: Weekday sets and week-to-date expansion
//! - **`service`**: Orchestration over catalog, completion and storage ports
//! - **`config`**, **`error`**, **`logging`**: Ambient plumbing
//!
//! # Architecture
//!
//! Everything except `service` is synchronous and pure. Storage, catalog
//! queries and completion tracking are reached through the async traits in
//! [`service`]; [`service::InMemoryStore`] implements all of them.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use study_schedule::models::{CostModel, Lesson, Modality, StudyCalendar};
//! use study_schedule::scheduler::AllocationEngine;
//! use study_schedule::validation::validate_feasibility;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
//! let weeks = StudyCalendar::new(start, end)
//!     .with_daily_hours(2.0)
//!     .with_weekly_days(5)
//!     .weeks();
//!
//! let lessons = (1..=3)
//!     .map(|n| {
//!         Lesson::new(format!("L{n}"))
//!             .with_subject("S1", "Math")
//!             .with_track("T1", "Algebra")
//!             .with_number(n)
//!             .with_duration(10.0)
//!     })
//!     .collect();
//! let costed = CostModel::new(1.0).unwrap().apply(lessons);
//!
//! validate_feasibility(Modality::Parallel, &costed, &weeks, 2.0, 5).unwrap();
//! let allocation = AllocationEngine::new()
//!     .allocate(&costed, &weeks, Modality::Parallel, None)
//!     .unwrap();
//! assert!(allocation.is_complete());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Demers, Keshav, Shenker (1989), "Analysis and Simulation of a Fair
//!   Queueing Algorithm" (credit-based fair sharing)

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod service;
pub mod validation;
pub mod weekdays;
