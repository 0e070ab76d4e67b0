//! Within-week interleaving of plan items.
//!
//! # Algorithm
//! 1. Group the week's items by (subject, track), each group in
//!    `order_in_week` order.
//! 2. Regroup by track name; visit track names alphabetically.
//! 3. Within a track name, order the subject groups by subject name and
//!    take one item from each in turn until the longest is exhausted.
//!
//! With tracks named "A" in Math and Physics this yields
//! Math-A1, Physics-A1, Math-A2, Physics-A2, ... followed by the "B" block.

use std::collections::{BTreeMap, HashMap};

use crate::models::PlanItem;

/// Reorders one week's items so subjects alternate within each track name.
///
/// The input must contain items of a single week. The output is a
/// permutation of the input.
pub fn interleave_week<'a>(items: &[&'a PlanItem]) -> Vec<&'a PlanItem> {
    let mut sorted: Vec<&'a PlanItem> = items.to_vec();
    sorted.sort_by_key(|i| i.order_in_week);

    // (subject, track) groups in first-appearance order.
    let mut group_index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<Vec<&'a PlanItem>> = Vec::new();
    for item in sorted {
        let key = (item.subject_name.as_str(), item.track_name.as_str());
        let slot = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(item);
    }

    let mut by_track: BTreeMap<&str, Vec<Vec<&'a PlanItem>>> = BTreeMap::new();
    for group in groups {
        let track = group[0].track_name.as_str();
        by_track.entry(track).or_default().push(group);
    }

    let mut out = Vec::with_capacity(items.len());
    for (_, mut subject_groups) in by_track {
        subject_groups.sort_by(|a, b| a[0].subject_name.cmp(&b[0].subject_name));
        let longest = subject_groups.iter().map(Vec::len).max().unwrap_or(0);
        for i in 0..longest {
            out.extend(subject_groups.iter().filter_map(|g| g.get(i).copied()));
        }
    }
    out
}
