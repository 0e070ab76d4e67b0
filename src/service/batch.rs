//! Batched date writes.
//!
//! Dates are written in fixed-size chunks. Writes inside a chunk run
//! concurrently and every outcome is collected. The whole update fails
//! only when the overall success rate drops below the configured minimum.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::PersistenceSink;
use crate::error::{PlanError, PlanResult};
use crate::models::DatedItem;

/// Non-fatal shortfall of a batched date update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialPersistenceWarning {
    /// Items that could not be updated.
    pub failed: usize,
    /// Items attempted.
    pub attempted: usize,
    /// Share of successful writes in [0, 1].
    pub success_rate: f64,
}

/// One failed date write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateUpdateFailure {
    pub item_id: String,
    pub message: String,
}

/// Outcome of a batched date update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateUpdateReport {
    pub attempted: usize,
    pub updated: usize,
    pub failures: Vec<DateUpdateFailure>,
    /// Present when some writes failed but the success rate held.
    pub warning: Option<PartialPersistenceWarning>,
}

impl DateUpdateReport {
    /// Share of successful writes; 1.0 when nothing was attempted.
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            1.0
        } else {
            self.updated as f64 / self.attempted as f64
        }
    }

    /// Whether every write succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes item dates in chunks of `batch_size`.
///
/// # Errors
/// [`PlanError::Persistence`] when fewer than `min_success_rate` of the
/// writes succeed.
pub async fn write_dates_in_batches(
    sink: &dyn PersistenceSink,
    items: &[DatedItem],
    batch_size: usize,
    min_success_rate: f64,
) -> PlanResult<DateUpdateReport> {
    let mut report = DateUpdateReport {
        attempted: items.len(),
        ..Default::default()
    };

    for (batch, chunk) in items.chunks(batch_size.max(1)).enumerate() {
        let outcomes = join_all(chunk.iter().map(|item| async move {
            (item, sink.update_item_date(&item.item_id, item.date).await)
        }))
        .await;

        for (item, outcome) in outcomes {
            match outcome {
                Ok(()) => report.updated += 1,
                Err(e) => report.failures.push(DateUpdateFailure {
                    item_id: item.item_id.clone(),
                    message: e.to_string(),
                }),
            }
        }
        debug!(batch, size = chunk.len(), "date batch written");
    }

    let rate = report.success_rate();
    if rate < min_success_rate {
        warn!(
            attempted = report.attempted,
            failed = report.failures.len(),
            rate,
            "date update below success threshold"
        );
        return Err(PlanError::persistence(format!(
            "only {} of {} item dates were updated ({:.1}%)",
            report.updated,
            report.attempted,
            rate * 100.0
        )));
    }

    if !report.is_complete() {
        warn!(
            attempted = report.attempted,
            failed = report.failures.len(),
            "some item dates were not updated"
        );
        report.warning = Some(PartialPersistenceWarning {
            failed: report.failures.len(),
            attempted: report.attempted,
            success_rate: rate,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPlanItem, PlanRequest};
    use crate::service::InMemoryStore;
    use chrono::NaiveDate;
    use futures::executor::block_on;

    /// Stores `n` items ("item-1".."item-n") and dates them all.
    fn seeded(store: &InMemoryStore, n: usize) -> Vec<DatedItem> {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let request = PlanRequest::new("student", date, date + chrono::Duration::days(13));
        let plan = block_on(store.create_plan(&request)).unwrap();
        let items = (0..n)
            .map(|i| NewPlanItem {
                lesson_id: format!("lesson-{i}"),
                week_index: 1,
                order_in_week: i as u32 + 1,
                review: false,
                subject_name: "S".into(),
                track_name: "T".into(),
                raw_duration_minutes: None,
            })
            .collect();
        block_on(store.insert_items(&plan.id, items))
            .unwrap()
            .into_iter()
            .map(|item| DatedItem {
                item_id: item.id,
                lesson_id: item.lesson_id,
                week_index: item.week_index,
                order_in_week: item.order_in_week,
                date,
            })
            .collect()
    }

    #[test]
    fn test_all_written() {
        let store = InMemoryStore::new();
        let items = seeded(&store, 250);
        let report = block_on(write_dates_in_batches(&store, &items, 100, 0.9)).unwrap();
        assert_eq!(report.attempted, 250);
        assert_eq!(report.updated, 250);
        assert!(report.warning.is_none());
        assert_eq!(store.date_update_count(), 250);
    }

    #[test]
    fn test_partial_failure_above_threshold() {
        let store = InMemoryStore::new();
        let items = seeded(&store, 20);
        store.fail_date_updates_for(["item-3", "item-7"]);
        let report = block_on(write_dates_in_batches(&store, &items, 100, 0.9)).unwrap();
        assert_eq!(report.updated, 18);
        assert_eq!(report.failures.len(), 2);
        let warning = report.warning.unwrap();
        assert_eq!(warning.failed, 2);
        assert!((warning.success_rate - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_failure_below_threshold() {
        let store = InMemoryStore::new();
        let items = seeded(&store, 20);
        store.fail_date_updates_for(["item-1", "item-2", "item-3"]);
        let err = block_on(write_dates_in_batches(&store, &items, 7, 0.9)).unwrap_err();
        assert!(matches!(err, PlanError::Persistence { .. }));
    }

    #[test]
    fn test_empty_input() {
        let store = InMemoryStore::new();
        let report = block_on(write_dates_in_batches(&store, &[], 100, 0.9)).unwrap();
        assert_eq!(report.attempted, 0);
        assert!((report.success_rate() - 1.0).abs() < 1e-12);
    }
}
