//! Week-to-date expansion.
//!
//! # Algorithm
//! For each week that has items:
//! 1. The week window starts at `plan_start + (week - 1) * 7` and spans
//!    7 days, clipped to `plan_end`.
//! 2. The usable days are the selected weekdays occurring in that window,
//!    in ascending weekday number. When a clipped window holds none of
//!    them, the full selection is used and every date clamps to the
//!    window start.
//! 3. The week's items are interleaved (see [`interleave_week`]) and
//!    split across the usable days: `total / days` each, the first
//!    `total % days` days taking one extra.
//! 4. Each day's date is the first occurrence of its weekday in the
//!    window, clamped to the window start if it would fall outside.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use super::{interleave_week, weekday_number, WeekdaySet};
use crate::models::{DatedItem, PlanItem};

/// Computes a calendar date for every plan item.
///
/// Pure and deterministic: identical inputs give identical dates. Every
/// input item appears exactly once in the output, weeks in ascending
/// order.
pub fn expand_dates(
    plan_start: NaiveDate,
    plan_end: NaiveDate,
    items: &[PlanItem],
    weekdays: &WeekdaySet,
) -> Vec<DatedItem> {
    let mut by_week: BTreeMap<u32, Vec<&PlanItem>> = BTreeMap::new();
    for item in items {
        by_week.entry(item.week_index).or_default().push(item);
    }

    let mut out = Vec::with_capacity(items.len());
    for (week, week_items) in by_week {
        let base = plan_start + Duration::days(i64::from(week.saturating_sub(1)) * 7);
        let window_end = (base + Duration::days(6)).min(plan_end).max(base);
        let span = (window_end - base).num_days();
        let base_dow = weekday_number(base);

        let mut days: Vec<u8> = (0..=span)
            .map(|offset| (i64::from(base_dow) + offset).rem_euclid(7) as u8)
            .filter(|d| weekdays.contains(*d))
            .collect();
        if days.is_empty() {
            debug!(week, %window_end, "no selected weekday in clipped window");
            days = weekdays.days().to_vec();
        }
        days.sort_unstable();

        let ordered = interleave_week(&week_items);
        let total = ordered.len();
        let per_day = total / days.len();
        let extra = total % days.len();

        let mut queue = ordered.into_iter();
        for (i, &day) in days.iter().enumerate() {
            let offset = (i64::from(day) - i64::from(base_dow) + 7) % 7;
            let mut date = base + Duration::days(offset);
            if date < base || date > window_end {
                warn!(week, %date, "computed date outside week window, using week start");
                date = base;
            }

            let count = per_day + usize::from(i < extra);
            for item in queue.by_ref().take(count) {
                out.push(DatedItem {
                    item_id: item.id.clone(),
                    lesson_id: item.lesson_id.clone(),
                    week_index: item.week_index,
                    order_in_week: item.order_in_week,
                    date,
                });
            }
        }
        debug!(week, items = total, days = days.len(), "week dates expanded");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn item(id: &str, week: u32, order: u32, subject: &str, track: &str) -> PlanItem {
        PlanItem {
            id: id.into(),
            lesson_id: format!("lesson-{id}"),
            week_index: week,
            order_in_week: order,
            review: false,
            subject_name: subject.into(),
            track_name: track.into(),
            raw_duration_minutes: None,
            scheduled_date: None,
        }
    }

    fn dates_by_item(dated: &[DatedItem]) -> HashMap<String, NaiveDate> {
        dated.iter().map(|x| (x.item_id.clone(), x.date)).collect()
    }

    #[test]
    fn test_mon_wed_fri_split() {
        // Plan starts Monday 2025-03-03; 9 items over three subjects.
        let mut items = Vec::new();
        for (s, subject) in ["Bio", "Chem", "Math"].iter().enumerate() {
            for n in 0..3u32 {
                let order = s as u32 * 3 + n + 1;
                items.push(item(&format!("{subject}{n}"), 1, order, subject, "A"));
            }
        }
        let set = WeekdaySet::new([1, 3, 5]).unwrap();
        let dated = expand_dates(d(3, 3), d(3, 30), &items, &set);
        assert_eq!(dated.len(), 9);

        let per_day: Vec<usize> = [d(3, 3), d(3, 5), d(3, 7)]
            .iter()
            .map(|date| dated.iter().filter(|x| x.date == *date).count())
            .collect();
        assert_eq!(per_day, vec![3, 3, 3]);

        // Monday gets the first item of every subject.
        let monday: Vec<&str> = dated
            .iter()
            .filter(|x| x.date == d(3, 3))
            .map(|x| x.item_id.as_str())
            .collect();
        assert_eq!(monday, vec!["Bio0", "Chem0", "Math0"]);
    }

    #[test]
    fn test_remainder_goes_to_first_days() {
        let items: Vec<PlanItem> = (1..=7)
            .map(|n| item(&format!("i{n}"), 1, n, "S", "A"))
            .collect();
        let set = WeekdaySet::new([1, 3, 5]).unwrap();
        let dated = expand_dates(d(3, 3), d(3, 30), &items, &set);
        let count = |date: NaiveDate| dated.iter().filter(|x| x.date == date).count();
        assert_eq!(count(d(3, 3)), 3);
        assert_eq!(count(d(3, 5)), 2);
        assert_eq!(count(d(3, 7)), 2);
    }

    #[test]
    fn test_window_not_starting_on_monday() {
        // Plan starts Thursday 2025-03-06: window Thu..Wed. Mon and Wed
        // fall in the following calendar week, ordered by weekday number.
        let items: Vec<PlanItem> = (1..=3)
            .map(|n| item(&format!("i{n}"), 1, n, "S", "A"))
            .collect();
        let set = WeekdaySet::new([1, 3, 5]).unwrap();
        let dates = dates_by_item(&expand_dates(d(3, 6), d(3, 30), &items, &set));
        assert_eq!(dates["i1"], d(3, 10)); // Monday
        assert_eq!(dates["i2"], d(3, 12)); // Wednesday
        assert_eq!(dates["i3"], d(3, 7)); // Friday
    }

    #[test]
    fn test_dates_within_week_window() {
        let start = d(3, 4);
        let items: Vec<PlanItem> = (1..=4)
            .flat_map(|w| (1..=5).map(move |n| item(&format!("w{w}i{n}"), w, n, "S", "A")))
            .collect();
        let set = WeekdaySet::new([0, 2, 6]).unwrap();
        let dated = expand_dates(start, d(3, 31), &items, &set);
        assert_eq!(dated.len(), items.len());
        for x in &dated {
            let base = start + Duration::days(i64::from(x.week_index - 1) * 7);
            assert!(x.date >= base && x.date <= base + Duration::days(6));
            assert!(set.contains(weekday_number(x.date)));
        }
    }

    #[test]
    fn test_weeks_without_items_are_skipped() {
        let items = vec![item("a", 3, 1, "S", "A")];
        let dated = expand_dates(d(3, 3), d(3, 30), &items, &WeekdaySet::default());
        assert_eq!(dated.len(), 1);
        assert_eq!(dated[0].date, d(3, 17));
    }

    #[test]
    fn test_idempotent() {
        let items: Vec<PlanItem> = (1..=12)
            .map(|n| item(&format!("i{n}"), 1 + n % 3, n, ["A", "B"][n as usize % 2], "T"))
            .collect();
        let set = WeekdaySet::new([2, 4]).unwrap();
        assert_eq!(
            expand_dates(d(3, 3), d(3, 30), &items, &set),
            expand_dates(d(3, 3), d(3, 30), &items, &set)
        );
    }

    #[test]
    fn test_clipped_final_week_stays_before_plan_end() {
        // Plan Mon 2025-03-03 .. Tue 03-11: week 2 is only Mon and Tue.
        let items: Vec<PlanItem> = (1..=10)
            .map(|n| item(&format!("i{n}"), 2, n, ["Bio", "Math"][n as usize % 2], "A"))
            .collect();
        let set = WeekdaySet::new([1, 2, 3, 4, 5]).unwrap();
        let dated = expand_dates(d(3, 3), d(3, 11), &items, &set);
        assert_eq!(dated.len(), 10);
        let count = |date: NaiveDate| dated.iter().filter(|x| x.date == date).count();
        assert_eq!(count(d(3, 10)), 5);
        assert_eq!(count(d(3, 11)), 5);
    }

    #[test]
    fn test_clipped_window_without_selected_day_uses_start() {
        // Week 2 is Mon 03-10 only; the selection is Wed and Fri.
        let items: Vec<PlanItem> = (1..=4)
            .map(|n| item(&format!("i{n}"), 2, n, "S", "A"))
            .collect();
        let set = WeekdaySet::new([3, 5]).unwrap();
        let dated = expand_dates(d(3, 3), d(3, 10), &items, &set);
        assert_eq!(dated.len(), 4);
        assert!(dated.iter().all(|x| x.date == d(3, 10)));
    }
}
