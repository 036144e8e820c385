//! Aggregation of normalized rows into one row per period.
//!
//! Summation is the only reduction applied to levels. The single explicit
//! average (annual inflation from monthly rates) goes through
//! [`mean_by_period`]. Ratios are absent, never zero or infinite, when the
//! denominator is zero.

use crate::normalize::AnnualRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sum of all rows sharing one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub year: i32,
    /// Label of the first row seen for this period.
    pub label: String,
    pub value: f64,
    /// Number of rows summed.
    pub count: usize,
}

/// Arithmetic mean of all observations sharing one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMean {
    pub year: i32,
    pub mean: f64,
    pub count: usize,
}

/// Sum rows per year. Output is unique per year and sorted ascending.
pub fn sum_by_period<'a, I>(rows: I) -> Vec<PeriodTotal>
where
    I: IntoIterator<Item = &'a AnnualRow>,
{
    let mut totals: BTreeMap<i32, PeriodTotal> = BTreeMap::new();
    for row in rows {
        totals
            .entry(row.year)
            .and_modify(|t| {
                t.value += row.value;
                t.count += 1;
            })
            .or_insert_with(|| PeriodTotal {
                year: row.year,
                label: row.period_label.clone(),
                value: row.value,
                count: 1,
            });
    }
    totals.into_values().collect()
}

/// Sum rows per year, separately for each value of a classification field.
///
/// Rows that do not carry `field` are left out of every group.
pub fn sum_by_dimension(rows: &[AnnualRow], field: &str) -> BTreeMap<String, Vec<PeriodTotal>> {
    let mut groups: BTreeMap<String, Vec<&AnnualRow>> = BTreeMap::new();
    for row in rows {
        if let Some(key) = row.field(field) {
            groups.entry(key.to_string()).or_default().push(row);
        }
    }
    groups
        .into_iter()
        .map(|(key, members)| (key, sum_by_period(members)))
        .collect()
}

/// Mean of `(year, value)` observations per year, sorted ascending.
pub fn mean_by_period(points: &[(i32, f64)]) -> Vec<PeriodMean> {
    let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for &(year, value) in points {
        let entry = sums.entry(year).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(year, (sum, count))| PeriodMean {
            year,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator).filter(|r| r.is_finite())
}

/// Percentage change from `previous` to `current`; `None` when `previous` is zero.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    ratio(current - previous, previous).map(|r| r * 100.0)
}
