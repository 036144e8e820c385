//! Energy balance forecasts: supply versus consumption.
//!
//! Records look like `{ year, commodity, indicator, value }`. The indicator
//! decides which side of the balance a row feeds; rows with any other
//! indicator are ignored. Units (KToE, PetaJoules) are opaque magnitudes.

use super::{forecast_line, future_years, LineRow, Status, CHART_HORIZON, KPI_HORIZON};
use crate::aggregate::{ratio, sum_by_period};
use crate::normalize::{normalize_annual, AnnualRow};
use crate::period::fiscal_year_label;
use crate::record::{fields, RawRecord};
use crate::risk::slugify;
use crate::thresholds::{ENERGY_PRESSURE_RATIO, ENERGY_SURPLUS_RATIO};
use crate::trend::{project, trailing, LinearTrend, TREND_WINDOW};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated energy balance for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyYear {
    pub year: i32,
    pub label: String,
    pub supply: f64,
    pub consumption: f64,
    /// `supply / consumption`; absent when consumption is zero.
    pub ratio: Option<f64>,
}

impl EnergyYear {
    fn new(year: i32, label: String, supply: f64, consumption: f64) -> Self {
        Self {
            year,
            label,
            supply,
            consumption,
            ratio: ratio(supply, consumption),
        }
    }
}

/// Next-year headline projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyOutlook {
    pub year: i32,
    pub supply: f64,
    pub consumption: f64,
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyForecast {
    pub history: Vec<EnergyYear>,
    pub forecast_line: Vec<LineRow<EnergyYear>>,
    pub outlook: EnergyOutlook,
    pub supply_trend: Option<LinearTrend>,
    pub consumption_trend: Option<LinearTrend>,
    pub status: Status,
}

impl EnergyForecast {
    pub fn latest(&self) -> Option<&EnergyYear> {
        self.history.last()
    }

    /// Projected rows only.
    pub fn projections(&self) -> impl Iterator<Item = &EnergyYear> {
        self.forecast_line
            .iter()
            .filter(|r| r.projected)
            .map(|r| &r.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Supply,
    Consumption,
}

fn classify(indicator: &str) -> Option<Flow> {
    let lower = indicator.to_ascii_lowercase();
    if lower.contains("supply") || lower.contains("production") {
        Some(Flow::Supply)
    } else if lower.contains("consumption") {
        Some(Flow::Consumption)
    } else {
        None
    }
}

fn normalized_rows(records: &[RawRecord]) -> Vec<AnnualRow> {
    normalize_annual(
        records,
        fields::VALUE,
        &[fields::INDICATOR, fields::COMMODITY],
    )
    .into_rows()
}

/// Combine rows of one scope (all commodities, or one) into yearly balances.
fn combine<'a>(rows: impl IntoIterator<Item = &'a AnnualRow>) -> Vec<EnergyYear> {
    let mut supply = Vec::new();
    let mut consumption = Vec::new();
    for row in rows {
        match row.field(fields::INDICATOR).and_then(classify) {
            Some(Flow::Supply) => supply.push(row),
            Some(Flow::Consumption) => consumption.push(row),
            None => {}
        }
    }

    let mut years: BTreeMap<i32, (String, f64, f64)> = BTreeMap::new();
    for total in sum_by_period(supply) {
        years.insert(total.year, (total.label, total.value, 0.0));
    }
    for total in sum_by_period(consumption) {
        years
            .entry(total.year)
            .or_insert_with(|| (total.label.clone(), 0.0, 0.0))
            .2 = total.value;
    }

    years
        .into_iter()
        .map(|(year, (label, s, c))| EnergyYear::new(year, label, s, c))
        .collect()
}

/// Yearly supply/consumption totals across all commodities.
pub fn aggregate_energy(records: &[RawRecord]) -> Vec<EnergyYear> {
    combine(&normalized_rows(records))
}

/// Yearly supply/consumption totals per commodity.
pub fn aggregate_energy_by_commodity(records: &[RawRecord]) -> BTreeMap<String, Vec<EnergyYear>> {
    let rows = normalized_rows(records);
    // Spellings that slug alike ("Crude Oil", "crude oil") are one commodity,
    // named by the first spelling seen.
    let mut groups: BTreeMap<String, (&str, Vec<&AnnualRow>)> = BTreeMap::new();
    for row in &rows {
        if let Some(commodity) = row.field(fields::COMMODITY) {
            groups
                .entry(slugify(commodity))
                .or_insert_with(|| (commodity, Vec::new()))
                .1
                .push(row);
        }
    }
    groups
        .into_values()
        .map(|(commodity, members)| (commodity.to_string(), combine(members)))
        .filter(|(_, years)| !years.is_empty())
        .collect()
}

/// Forecast the aggregate energy balance.
pub fn build_energy_forecast(records: &[RawRecord]) -> Option<EnergyForecast> {
    forecast_energy_series(&aggregate_energy(records))
}

/// Forecast every commodity's balance independently.
pub fn build_commodity_forecasts(records: &[RawRecord]) -> BTreeMap<String, EnergyForecast> {
    aggregate_energy_by_commodity(records)
        .into_iter()
        .filter_map(|(commodity, history)| {
            forecast_energy_series(&history).map(|f| (commodity, f))
        })
        .collect()
}

/// Forecast an already-aggregated, ascending energy series.
///
/// Supply and consumption get independent trends over the 10-year tail. A
/// side without a trend is projected flat from its last value.
pub fn forecast_energy_series(history: &[EnergyYear]) -> Option<EnergyForecast> {
    let last = history.last()?;
    let window = trailing(history, TREND_WINDOW);

    let supply_points: Vec<(f64, f64)> = window.iter().map(|y| (y.year as f64, y.supply)).collect();
    let consumption_points: Vec<(f64, f64)> = window
        .iter()
        .map(|y| (y.year as f64, y.consumption))
        .collect();
    let supply_trend = LinearTrend::fit(&supply_points);
    let consumption_trend = LinearTrend::fit(&consumption_points);

    let years = future_years(last.year, CHART_HORIZON);
    let xs: Vec<f64> = years.iter().map(|&y| y as f64).collect();
    let supply = project(supply_trend.as_ref(), last.supply, &xs);
    let consumption = project(consumption_trend.as_ref(), last.consumption, &xs);

    let projected: Vec<EnergyYear> = years
        .iter()
        .zip(supply.iter().zip(&consumption))
        .map(|(&year, (&s, &c))| EnergyYear::new(year, fiscal_year_label(year), s, c))
        .collect();

    let next = &projected[KPI_HORIZON - 1];
    let outlook = EnergyOutlook {
        year: next.year,
        supply: next.supply,
        consumption: next.consumption,
        ratio: next.ratio,
    };
    let status = status_for_ratio(outlook.ratio);

    Some(EnergyForecast {
        forecast_line: forecast_line(history, projected),
        history: history.to_vec(),
        outlook,
        supply_trend,
        consumption_trend,
        status,
    })
}

/// Status from a projected supply/consumption ratio.
pub fn status_for_ratio(projected_ratio: Option<f64>) -> Status {
    match projected_ratio {
        Some(r) if r < ENERGY_PRESSURE_RATIO => Status::Pressure,
        Some(r) if r > ENERGY_SURPLUS_RATIO => Status::Surplus,
        _ => Status::Stable,
    }
}
