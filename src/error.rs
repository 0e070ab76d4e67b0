//! Error taxonomy for plan generation.
//!
//! Every fallible operation in the crate returns [`PlanResult`]. The
//! variants map one-to-one onto the failure categories a caller has to
//! react to differently:
//!
//! | Variant | Caller reaction |
//! |---------|-----------------|
//! | `Validation` | Show verbatim, never retry |
//! | `InsufficientCapacity` | Suggest more hours, fewer subjects, higher priority |
//! | `Catalog` | Filters selected nothing; adjust the selection |
//! | `Conflict` | Clean up and retry |
//! | `InternalInvariant` | Bug: validator and engine disagree |
//! | `Persistence` | Storage failed; roll back the plan |
//! | `Config` | Fix the configuration file |
//!
//! Partial date-write failures above the success threshold are not errors;
//! they are reported through
//! [`PartialPersistenceWarning`](crate::service::PartialPersistenceWarning).

use serde::{Deserialize, Serialize};

use crate::models::Modality;
use crate::validation::ValidationError;

/// Result type used across the crate.
pub type PlanResult<T> = Result<T, PlanError>;

/// Top-level error type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlanError {
    /// Caller input is structurally or semantically invalid.
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// Total or weekly feasibility check failed.
    #[error("insufficient study time: {0}")]
    InsufficientCapacity(CapacityShortfall),

    /// The catalog filters produced an empty level.
    #[error("catalog lookup failed: {0}")]
    Catalog(CatalogError),

    /// Uniqueness or concurrency conflict while creating a plan.
    #[error("conflict while creating plan: {message}")]
    Conflict { message: String },

    /// The allocation engine could not honour a weekly guarantee even
    /// though feasibility validation passed.
    #[error("internal invariant violated: {message}")]
    InternalInvariant { message: String },

    /// Storage layer failure.
    #[error("persistence failure: {message}")]
    Persistence { message: String },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PlanError {
    /// Creates a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal invariant error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant {
            message: message.into(),
        }
    }

    /// Whether the operation may succeed if retried after cleanup.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether the message is meant for the end user.
    ///
    /// Internal invariant, persistence and configuration failures are
    /// operator-facing.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InsufficientCapacity(_) | Self::Catalog(_)
        )
    }
}

impl From<ValidationError> for PlanError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<CapacityShortfall> for PlanError {
    fn from(shortfall: CapacityShortfall) -> Self {
        Self::InsufficientCapacity(shortfall)
    }
}

impl From<CatalogError> for PlanError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

/// Empty result at one level of the catalog filter chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum CatalogError {
    /// No tracks belong to the selected subjects (and course).
    #[error("no tracks found for the selected subjects")]
    NoTracksFound,
    /// The selected tracks (or module subset) contain no modules.
    #[error("no modules found for the selected tracks")]
    NoModulesFound,
    /// No lesson passed the priority filter.
    #[error("no lessons found matching the selected criteria")]
    NoLessonsFound,
    /// A catalog row is missing its module, track or subject.
    #[error("catalog row for lesson '{lesson_id}' is missing its {level}")]
    IncompleteRow { lesson_id: String, level: String },
}

/// Structured detail for a failed feasibility check.
///
/// Carries enough information for the caller to suggest a remedy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CapacityShortfall {
    /// Total lesson cost exceeds total working capacity.
    Total {
        /// Required study hours, rounded up.
        required_hours: f64,
        /// Available study hours, rounded up.
        available_hours: f64,
        /// Daily hours that would make the plan fit, rounded up to 0.1.
        required_daily_hours: f64,
        /// Daily hours requested by the student.
        current_daily_hours: f64,
    },
    /// The tightest working week cannot host one item per group.
    Weekly {
        modality: Modality,
        /// Sum of the cheapest lesson per group, rounded up.
        minimum_required_minutes: f64,
        /// Capacity of the tightest working week, rounded down.
        weekly_capacity_minutes: f64,
        /// Number of tracks (parallel) or subjects (sequential).
        group_count: usize,
    },
    /// No working week has positive capacity.
    NoUsableCapacity { weekly_capacity_minutes: f64 },
}

impl std::fmt::Display for CapacityShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Total {
                required_hours,
                available_hours,
                required_daily_hours,
                current_daily_hours,
            } => write!(
                f,
                "{required_hours}h required but only {available_hours}h available \
                 (needs {required_daily_hours}h/day, currently {current_daily_hours}h/day)"
            ),
            Self::Weekly {
                modality,
                minimum_required_minutes,
                weekly_capacity_minutes,
                group_count,
            } => write!(
                f,
                "{modality} mode needs {minimum_required_minutes} min/week to cover all \
                 {group_count} groups but the tightest week has {weekly_capacity_minutes} min"
            ),
            Self::NoUsableCapacity {
                weekly_capacity_minutes,
            } => write!(
                f,
                "no usable weekly capacity (tightest working week: {weekly_capacity_minutes} min)"
            ),
        }
    }
}
