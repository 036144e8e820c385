//! Fiscal period resolution.
//!
//! Indian statistical releases label years as `"2022-23"` (April 2022 to
//! March 2023) and months by name. This module turns those labels into
//! comparable integers: the fiscal year's leading calendar year, and a month
//! offset in the April-to-March sequence.

use chrono::Month;

/// Numeric sort key for a month name that could not be resolved.
///
/// Sorts after every real month; rows carrying it are excluded by the normalizer.
pub const UNKNOWN_MONTH_ORDER: u8 = 99;

/// Months per fiscal year.
pub const MONTHS_PER_YEAR: u8 = 12;

/// Offset of January within the fiscal year (April = 0).
const JANUARY_ORDER: u8 = 9;

/// Leading 4-digit year of a fiscal-year label.
///
/// `"2022-23"` and `"2022"` both resolve to `2022`. Anything whose first four
/// characters are not ASCII digits yields `None`.
pub fn fiscal_year_start(label: &str) -> Option<i32> {
    let head = label.trim().get(..4)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

/// 0-based position of a month in the April..March fiscal sequence.
///
/// Accepts full names and three-letter abbreviations in any case.
pub fn fiscal_month_order(name: &str) -> Option<u8> {
    let month: Month = name.trim().parse().ok()?;
    Some(((month.number_from_month() + 8) % 12) as u8)
}

/// Like [`fiscal_month_order`], but returns [`UNKNOWN_MONTH_ORDER`] instead of `None`.
pub fn fiscal_month_sort_key(name: &str) -> u8 {
    fiscal_month_order(name).unwrap_or(UNKNOWN_MONTH_ORDER)
}

/// Canonical month name for a fiscal offset (0 = "April").
pub fn fiscal_month_name(order: u8) -> Option<&'static str> {
    if order >= MONTHS_PER_YEAR {
        return None;
    }
    let number = (order + 3) % 12 + 1;
    Month::try_from(number).ok().map(|m| m.name())
}

/// Calendar year in which a fiscal month falls.
///
/// January through March belong to the calendar year after the fiscal start.
pub fn calendar_year(fiscal_year: i32, order: u8) -> i32 {
    if order >= JANUARY_ORDER {
        fiscal_year + 1
    } else {
        fiscal_year
    }
}

/// The fiscal month after `(fiscal_year, order)`.
pub fn next_fiscal_month(fiscal_year: i32, order: u8) -> (i32, u8) {
    if order + 1 >= MONTHS_PER_YEAR {
        (fiscal_year + 1, 0)
    } else {
        (fiscal_year, order + 1)
    }
}

/// Display label `"<Month> <Year>"` using the calendar year of the month.
pub fn month_label(fiscal_year: i32, order: u8) -> String {
    let name = fiscal_month_name(order).unwrap_or("Unknown");
    format!("{name} {}", calendar_year(fiscal_year, order))
}

/// Display label for a fiscal year, e.g. `2022` -> `"2022-23"`.
pub fn fiscal_year_label(year: i32) -> String {
    format!("{year}-{:02}", (year + 1).rem_euclid(100))
}
