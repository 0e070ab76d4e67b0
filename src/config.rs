//! Planner configuration.
//!
//! All tunables of the cost model, allocation engine and persistence
//! boundary live in [`PlannerConfig`]. Values can be loaded from TOML;
//! missing keys take their defaults.
//!
//! ```
//! use study_schedule::config::PlannerConfig;
//!
//! let cfg = PlannerConfig::from_toml_str("review_pool_size = 3").unwrap();
//! assert_eq!(cfg.review_pool_size, 3);
//! assert_eq!(cfg.update_batch_size, 100);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Duration assumed for lessons without an estimate (minutes).
pub const DEFAULT_LESSON_MINUTES: f64 = 10.0;

/// Lecture time plus half again for notes and exercises.
pub const STUDY_FACTOR: f64 = 1.5;

/// Number of trailing lessons kept for review per track or subject.
pub const REVIEW_POOL_SIZE: usize = 5;

/// Date updates issued per concurrent batch.
pub const UPDATE_BATCH_SIZE: usize = 100;

/// Below this share of successful date writes the update fails.
pub const MIN_UPDATE_SUCCESS_RATE: f64 = 0.9;

/// Tunables for plan generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Raw duration used when a lesson has none (minutes).
    pub default_lesson_minutes: f64,
    /// Multiplier applied to speed-adjusted lecture time.
    pub study_factor: f64,
    /// Review pool size per track (and per subject in sequential mode).
    pub review_pool_size: usize,
    /// Batch size for date updates.
    pub update_batch_size: usize,
    /// Minimum success rate for batched date updates (0, 1].
    pub min_update_success_rate: f64,
    /// Weekdays (0 = Sunday) used when a plan has no stored preference.
    pub default_weekdays: Vec<u8>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_lesson_minutes: DEFAULT_LESSON_MINUTES,
            study_factor: STUDY_FACTOR,
            review_pool_size: REVIEW_POOL_SIZE,
            update_batch_size: UPDATE_BATCH_SIZE,
            min_update_success_rate: MIN_UPDATE_SUCCESS_RATE,
            default_weekdays: vec![1, 2, 3, 4, 5],
        }
    }
}

impl PlannerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> PlanResult<Self> {
        let cfg: Self = toml::from_str(s).map_err(|e| PlanError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PlanError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> PlanResult<()> {
        if !(self.default_lesson_minutes.is_finite() && self.default_lesson_minutes > 0.0) {
            return Err(PlanError::Config(
                "default_lesson_minutes must be positive".into(),
            ));
        }
        if !(self.study_factor.is_finite() && self.study_factor > 0.0) {
            return Err(PlanError::Config("study_factor must be positive".into()));
        }
        if self.review_pool_size == 0 {
            return Err(PlanError::Config("review_pool_size must be at least 1".into()));
        }
        if self.update_batch_size == 0 {
            return Err(PlanError::Config(
                "update_batch_size must be at least 1".into(),
            ));
        }
        if !(self.min_update_success_rate > 0.0 && self.min_update_success_rate <= 1.0) {
            return Err(PlanError::Config(
                "min_update_success_rate must be in (0, 1]".into(),
            ));
        }
        if self.default_weekdays.is_empty() || self.default_weekdays.iter().any(|&d| d > 6) {
            return Err(PlanError::Config(
                "default_weekdays must be non-empty values in 0..=6".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = PlannerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.review_pool_size, 5);
        assert!((cfg.study_factor - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg = PlannerConfig::from_toml_str(
            "update_batch_size = 25\ndefault_weekdays = [1, 3, 5]\n",
        )
        .unwrap();
        assert_eq!(cfg.update_batch_size, 25);
        assert_eq!(cfg.default_weekdays, vec![1, 3, 5]);
        assert_eq!(cfg.review_pool_size, REVIEW_POOL_SIZE);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(PlannerConfig::from_toml_str("study_factor = 0.0").is_err());
        assert!(PlannerConfig::from_toml_str("review_pool_size = 0").is_err());
        assert!(PlannerConfig::from_toml_str("min_update_success_rate = 1.5").is_err());
        assert!(PlannerConfig::from_toml_str("default_weekdays = [7]").is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = PlannerConfig::from_toml_str("review_pool_size = \"five\"").unwrap_err();
        assert!(matches!(err, PlanError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PlannerConfig::from_file("/nonexistent/planner.toml").unwrap_err();
        assert!(matches!(err, PlanError::Config(_)));
    }
}
