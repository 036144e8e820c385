//! National-accounts forecasts (GDP and GFCF at constant prices).
//!
//! Records look like `{ year, revision, value, growth_rate? }`. The same
//! fiscal year is often published several times as estimates are revised;
//! only the lexicographically latest revision tag per year is kept. Levels
//! and published growth rates are deduplicated separately, so a row that only
//! carries `growth_rate` still counts as that year's official growth.

use super::{forecast_line, future_years, LineRow, Status, CHART_HORIZON, KPI_HORIZON};
use crate::aggregate::percent_change;
use crate::normalize::{normalize_annual, AnnualRow};
use crate::period::fiscal_year_label;
use crate::record::{fields, RawRecord};
use crate::thresholds::GDP_SLOWDOWN_GROWTH;
use crate::trend::{project, trailing, LinearTrend, TREND_WINDOW};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which national-accounts aggregate a series describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Gdp,
    Gfcf,
}

impl Aggregate {
    pub fn label(&self) -> &'static str {
        match self {
            Aggregate::Gdp => "GDP",
            Aggregate::Gfcf => "GFCF",
        }
    }
}

/// Where a year's growth figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthSource {
    /// Published alongside the estimate.
    Official,
    /// Year-over-year change of consecutive levels.
    Computed,
    /// Change between projected levels.
    Projected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsYear {
    pub year: i32,
    pub label: String,
    /// Revision tag of the kept estimate; empty for projections.
    pub revision: String,
    /// Constant-price level.
    pub value: f64,
    /// Growth over the previous year (%).
    pub growth: Option<f64>,
    pub growth_source: Option<GrowthSource>,
}

/// Next-year headline projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsOutlook {
    pub year: i32,
    pub value: f64,
    /// Projected growth over the latest actual level (%).
    pub growth: Option<f64>,
    /// Latest merged (official or computed) growth (%).
    pub latest_growth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsForecast {
    pub aggregate: Aggregate,
    pub history: Vec<AccountsYear>,
    pub forecast_line: Vec<LineRow<AccountsYear>>,
    pub outlook: AccountsOutlook,
    pub trend: Option<LinearTrend>,
    pub status: Status,
}

impl AccountsForecast {
    /// Growth of the most recent observed year, official where published.
    pub fn latest_growth(&self) -> Option<f64> {
        self.outlook.latest_growth
    }
}

/// Keep one row per year: the one with the greatest revision tag.
///
/// Ties keep the first row seen. Input must be sorted by year.
fn latest_revisions(rows: Vec<AnnualRow>) -> Vec<AnnualRow> {
    let mut kept: BTreeMap<i32, AnnualRow> = BTreeMap::new();
    for row in rows {
        match kept.get(&row.year) {
            Some(existing) if revision_of(existing) >= revision_of(&row) => {}
            _ => {
                kept.insert(row.year, row);
            }
        }
    }
    kept.into_values().collect()
}

fn revision_of(row: &AnnualRow) -> &str {
    row.field(fields::REVISION).unwrap_or("")
}

/// Published growth per year, latest revision first.
fn official_growth(records: &[RawRecord]) -> BTreeMap<i32, f64> {
    let rows = normalize_annual(records, fields::GROWTH_RATE, &[fields::REVISION]).into_rows();
    latest_revisions(rows)
        .into_iter()
        .map(|row| (row.year, row.value))
        .collect()
}

/// Attach merged growth: official where published, else computed from the
/// previous consecutive year.
fn with_growth(rows: &[AnnualRow], official: &BTreeMap<i32, f64>) -> Vec<AccountsYear> {
    let mut out: Vec<AccountsYear> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let computed = i
            .checked_sub(1)
            .map(|p| &rows[p])
            .filter(|prev| prev.year + 1 == row.year)
            .and_then(|prev| percent_change(prev.value, row.value));

        let (growth, growth_source) = match (official.get(&row.year), computed) {
            (Some(&g), _) => (Some(g), Some(GrowthSource::Official)),
            (None, Some(g)) => (Some(g), Some(GrowthSource::Computed)),
            (None, None) => (None, None),
        };

        out.push(AccountsYear {
            year: row.year,
            label: row.period_label.clone(),
            revision: revision_of(row).to_string(),
            value: row.value,
            growth,
            growth_source,
        });
    }
    out
}

/// Growth of the most recent year that has one: a published rate for a year
/// past the last level wins over the last level's own growth.
fn latest_merged_growth(history: &[AccountsYear], official: &BTreeMap<i32, f64>) -> Option<f64> {
    let last = history.last()?;
    match official.last_key_value() {
        Some((&year, &growth)) if year > last.year => Some(growth),
        _ => last.growth,
    }
}

/// Deduplicated, growth-annotated history of one aggregate.
pub fn accounts_history(records: &[RawRecord]) -> Vec<AccountsYear> {
    history_and_official(records).0
}

fn history_and_official(records: &[RawRecord]) -> (Vec<AccountsYear>, BTreeMap<i32, f64>) {
    let official = official_growth(records);
    let rows = normalize_annual(records, fields::VALUE, &[fields::REVISION]).into_rows();
    (with_growth(&latest_revisions(rows), &official), official)
}

/// Forecast a GDP or GFCF series.
///
/// Fits the constant-price level over the 10-year tail and projects one year
/// for the headline and five for the chart. Status is pressure when the
/// latest merged growth is below the slowdown threshold.
pub fn build_accounts_forecast(
    records: &[RawRecord],
    aggregate: Aggregate,
) -> Option<AccountsForecast> {
    let (history, official) = history_and_official(records);
    let last = history.last()?;

    let points: Vec<(f64, f64)> = trailing(&history, TREND_WINDOW)
        .iter()
        .map(|y| (y.year as f64, y.value))
        .collect();
    let trend = LinearTrend::fit(&points);

    let years = future_years(last.year, CHART_HORIZON);
    let xs: Vec<f64> = years.iter().map(|&y| y as f64).collect();
    let values = project(trend.as_ref(), last.value, &xs);

    let mut previous = last.value;
    let projected: Vec<AccountsYear> = years
        .iter()
        .zip(values)
        .map(|(&year, value)| {
            let growth = percent_change(previous, value);
            previous = value;
            AccountsYear {
                year,
                label: fiscal_year_label(year),
                revision: String::new(),
                value,
                growth,
                growth_source: growth.map(|_| GrowthSource::Projected),
            }
        })
        .collect();

    let next = &projected[KPI_HORIZON - 1];
    let latest_growth = latest_merged_growth(&history, &official);
    let outlook = AccountsOutlook {
        year: next.year,
        value: next.value,
        growth: next.growth,
        latest_growth,
    };
    let status = match latest_growth {
        Some(g) if g < GDP_SLOWDOWN_GROWTH => Status::Pressure,
        _ => Status::Stable,
    };

    tracing::debug!(
        aggregate = aggregate.label(),
        years = history.len(),
        ?latest_growth,
        "built national accounts forecast"
    );

    Some(AccountsForecast {
        aggregate,
        forecast_line: forecast_line(&history, projected),
        history,
        outlook,
        trend,
        status,
    })
}
