//! Grouped sums and percentages over record collections.
//!
//! Everything here is a pure function of its input; summaries are rebuilt
//! from scratch on every call.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::types::Money;

pub mod finance;
pub mod sales;

/// Label used for items whose grouping key is missing.
pub const NOT_IDENTIFIED: &str = "Not identified";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub count: usize,
    pub total: Money,
    /// Share of the grand total, in percent.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub groups: Vec<GroupSummary>,
    pub total: Money,
    pub count: usize,
}

impl Summary {
    pub fn group(&self, label: &str) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.label == label)
    }
}

/// Groups `items` by `key` and sums `value` per group.
///
/// Groups are ordered by descending total, ties broken by label.
pub fn summarize<T, K, V>(items: &[T], key: K, value: V) -> Summary
where
    K: Fn(&T) -> Option<String>,
    V: Fn(&T) -> Money,
{
    let mut groups: BTreeMap<String, (usize, Money)> = BTreeMap::new();
    for item in items {
        let label = key(item)
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| NOT_IDENTIFIED.to_string());
        let entry = groups.entry(label).or_insert((0, Money::ZERO));
        entry.0 += 1;
        entry.1 += value(item);
    }

    let total: Money = groups.values().map(|(_, sum)| *sum).sum();
    let mut groups: Vec<GroupSummary> = groups
        .into_iter()
        .map(|(label, (count, sum))| GroupSummary {
            label,
            count,
            total: sum,
            percentage: percentage(sum, total),
        })
        .collect();
    groups.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));

    Summary {
        groups,
        total,
        count: items.len(),
    }
}

/// Percentage of `part` in `whole`, clamped to `[0, 100]`; 0 for an empty
/// whole.
pub fn percentage(part: Money, whole: Money) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    part.ratio_percent(whole).clamp(0.0, 100.0)
}
