//! Domain forecast builders.
//!
//! Each builder composes normalization, aggregation and trend fitting for one
//! domain's record shape and returns a fresh, immutable result:
//! - `history`: the aggregated per-period rows
//! - `forecast_line`: history followed by projected rows, each tagged
//! - scalar KPIs for the next period
//! - a qualitative [`Status`]
//!
//! Every builder returns `None` when the input holds no usable rows.

pub mod accounts;
pub mod energy;
pub mod iip;
pub mod wpi;

pub use accounts::{
    build_accounts_forecast, AccountsForecast, AccountsOutlook, AccountsYear, Aggregate,
    GrowthSource,
};
pub use energy::{
    aggregate_energy, aggregate_energy_by_commodity, build_commodity_forecasts,
    build_energy_forecast, forecast_energy_series, EnergyForecast, EnergyOutlook, EnergyYear,
};
pub use iip::{build_iip_forecast, IipForecast, IipMonth};
pub use wpi::{build_wpi_forecast, InflationYear, MonthlyInflation, WpiForecast, WpiOutlook};

use serde::{Deserialize, Serialize};

/// Years ahead for headline KPIs.
pub const KPI_HORIZON: usize = 1;

/// Years ahead for the chart forecast line.
pub const CHART_HORIZON: usize = 5;

/// Months ahead for the industrial production forecast.
pub const IIP_HORIZON: usize = 6;

/// Qualitative outlook attached to every forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pressure,
    Stable,
    Surplus,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pressure => "pressure",
            Status::Stable => "stable",
            Status::Surplus => "surplus",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a chart line: either an observed period or a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRow<R> {
    #[serde(flatten)]
    pub row: R,
    pub projected: bool,
}

/// History rows followed by projected rows.
pub(crate) fn forecast_line<R: Clone>(history: &[R], projected: Vec<R>) -> Vec<LineRow<R>> {
    history
        .iter()
        .cloned()
        .map(|row| LineRow { row, projected: false })
        .chain(projected.into_iter().map(|row| LineRow { row, projected: true }))
        .collect()
}

/// Future x-values `last + 1 ..= last + horizon`.
pub(crate) fn future_years(last_year: i32, horizon: usize) -> Vec<i32> {
    (1..=horizon as i32).map(|step| last_year + step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_tags_projected_rows() {
        let line = forecast_line(&[1, 2], vec![3]);
        let tags: Vec<bool> = line.iter().map(|r| r.projected).collect();
        assert_eq!(tags, vec![false, false, true]);
        assert_eq!(line[2].row, 3);
    }

    #[test]
    fn future_years_count_forward() {
        assert_eq!(future_years(2023, 3), vec![2024, 2025, 2026]);
        assert!(future_years(2023, 0).is_empty());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Pressure).unwrap(), "\"pressure\"");
        assert_eq!(Status::Surplus.to_string(), "surplus");
    }
}
