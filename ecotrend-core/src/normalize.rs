//! Series normalization: raw records in, typed rows out.
//!
//! Each record's period is resolved and its value coerced. Rows where either
//! fails are dropped silently (statistical feeds routinely carry partial
//! rows); the number dropped is reported alongside the rows so callers can
//! observe data loss without changing the output.

use crate::coerce::parse_number;
use crate::period::{fiscal_month_name, fiscal_month_order, fiscal_year_start, month_label};
use crate::record::{fields, RawRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized annual observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualRow {
    /// Leading calendar year of the fiscal year.
    pub year: i32,
    /// The period label as it appeared in the source (e.g. `"2022-23"`).
    pub period_label: String,
    /// Always finite.
    pub value: f64,
    /// Classification fields carried through unchanged.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl AnnualRow {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// A normalized monthly observation within a fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    pub year: i32,
    /// Canonical month name, e.g. `"April"`.
    pub month: String,
    /// Position within the April..March fiscal year, in `0..12`.
    pub month_order: u8,
    /// Sortable display label `"<Month> <Year>"`.
    pub period_label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl MonthlyRow {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Chronological sort key.
    pub fn period_key(&self) -> (i32, u8) {
        (self.year, self.month_order)
    }
}

/// Normalizer output: the kept rows plus a count of dropped records.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub rows: Vec<T>,
    pub dropped: usize,
}

impl<T> Normalized<T> {
    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    /// Number of records that became rows.
    pub fn accepted(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Normalize annual records.
///
/// `value_field` names the numeric field; `carry` lists classification fields
/// copied into each row when present. Output is sorted ascending by year;
/// rows of the same year keep their input order.
pub fn normalize_annual(
    records: &[RawRecord],
    value_field: &str,
    carry: &[&str],
) -> Normalized<AnnualRow> {
    let mut rows: Vec<AnnualRow> = records
        .iter()
        .filter_map(|record| {
            let period_label = record.text(fields::YEAR)?;
            let year = fiscal_year_start(&period_label)?;
            let value = parse_number(record.value(value_field)?)?;
            Some(AnnualRow {
                year,
                period_label,
                value,
                fields: carried_fields(record, carry),
            })
        })
        .collect();

    rows.sort_by_key(|r| r.year);
    finish(rows, records.len(), "annual")
}

/// Normalize monthly records within fiscal years.
///
/// Rows whose month name cannot be resolved are dropped along with rows
/// carrying an invalid year or value. Output is sorted by (year, month order).
pub fn normalize_monthly(
    records: &[RawRecord],
    value_field: &str,
    carry: &[&str],
) -> Normalized<MonthlyRow> {
    let mut rows: Vec<MonthlyRow> = records
        .iter()
        .filter_map(|record| {
            let year = fiscal_year_start(&record.text(fields::YEAR)?)?;
            let month_order = fiscal_month_order(&record.text(fields::MONTH)?)?;
            let value = parse_number(record.value(value_field)?)?;
            Some(MonthlyRow {
                year,
                month: fiscal_month_name(month_order)?.to_string(),
                month_order,
                period_label: month_label(year, month_order),
                value,
                fields: carried_fields(record, carry),
            })
        })
        .collect();

    rows.sort_by_key(MonthlyRow::period_key);
    finish(rows, records.len(), "monthly")
}

fn carried_fields(record: &RawRecord, carry: &[&str]) -> BTreeMap<String, String> {
    carry
        .iter()
        .filter_map(|name| record.text(name).map(|v| (name.to_string(), v)))
        .collect()
}

fn finish<T>(rows: Vec<T>, total: usize, kind: &str) -> Normalized<T> {
    let dropped = total - rows.len();
    if dropped > 0 {
        tracing::debug!(kind, total, dropped, "dropped unparseable records");
    }
    Normalized { rows, dropped }
}
