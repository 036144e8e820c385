//! Wholesale price inflation forecast.
//!
//! The monthly WPI index is turned into month-over-month inflation, averaged
//! per fiscal year, and the annual averages are trended forward.

use super::{forecast_line, future_years, LineRow, Status, CHART_HORIZON, KPI_HORIZON};
use crate::aggregate::{mean_by_period, percent_change};
use crate::normalize::{normalize_monthly, MonthlyRow};
use crate::period::fiscal_year_label;
use crate::record::{fields, RawRecord};
use crate::thresholds::WPI_ALERT_INFLATION;
use crate::trend::{project, trailing, LinearTrend, TREND_WINDOW};
use serde::{Deserialize, Serialize};

/// Commodity value that marks the headline index.
pub const HEADLINE_COMMODITY: &str = "All commodities";

/// Month-over-month change of the headline index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyInflation {
    pub year: i32,
    pub month_order: u8,
    pub label: String,
    /// Percent change over the previous month.
    pub inflation: f64,
}

/// Mean monthly inflation for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationYear {
    pub year: i32,
    pub label: String,
    pub average_inflation: f64,
    /// Month rates that went into the average.
    pub months: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WpiOutlook {
    pub year: i32,
    pub inflation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WpiForecast {
    pub history: Vec<InflationYear>,
    pub monthly: Vec<MonthlyInflation>,
    pub forecast_line: Vec<LineRow<InflationYear>>,
    pub outlook: WpiOutlook,
    pub trend: Option<LinearTrend>,
    pub status: Status,
}

impl WpiForecast {
    /// Average inflation of the latest observed fiscal year.
    pub fn latest_inflation(&self) -> Option<f64> {
        self.history.last().map(|y| y.average_inflation)
    }
}

fn is_headline(row: &MonthlyRow) -> bool {
    row.field(fields::COMMODITY)
        .map_or(true, |c| c.eq_ignore_ascii_case(HEADLINE_COMMODITY))
}

/// Month-over-month inflation between consecutive headline rows.
///
/// A rate is attributed to the later month. Pairs whose previous index is
/// zero produce no rate.
pub fn monthly_inflation(records: &[RawRecord]) -> Vec<MonthlyInflation> {
    let rows: Vec<MonthlyRow> = normalize_monthly(records, fields::VALUE, &[fields::COMMODITY])
        .into_rows()
        .into_iter()
        .filter(is_headline)
        .collect();

    rows.windows(2)
        .filter_map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            percent_change(prev.value, cur.value).map(|inflation| MonthlyInflation {
                year: cur.year,
                month_order: cur.month_order,
                label: cur.period_label.clone(),
                inflation,
            })
        })
        .collect()
}

/// Annual averages of the monthly rates, ascending by fiscal year.
pub fn annual_inflation(monthly: &[MonthlyInflation]) -> Vec<InflationYear> {
    let points: Vec<(i32, f64)> = monthly.iter().map(|m| (m.year, m.inflation)).collect();
    mean_by_period(&points)
        .into_iter()
        .map(|m| InflationYear {
            year: m.year,
            label: fiscal_year_label(m.year),
            average_inflation: m.mean,
            months: m.count,
        })
        .collect()
}

/// Forecast annual WPI inflation.
pub fn build_wpi_forecast(records: &[RawRecord]) -> Option<WpiForecast> {
    let monthly = monthly_inflation(records);
    let history = annual_inflation(&monthly);
    let last = history.last()?;

    let points: Vec<(f64, f64)> = trailing(&history, TREND_WINDOW)
        .iter()
        .map(|y| (y.year as f64, y.average_inflation))
        .collect();
    let trend = LinearTrend::fit(&points);

    let years = future_years(last.year, CHART_HORIZON);
    let xs: Vec<f64> = years.iter().map(|&y| y as f64).collect();
    let projected: Vec<InflationYear> = years
        .iter()
        .zip(project(trend.as_ref(), last.average_inflation, &xs))
        .map(|(&year, inflation)| InflationYear {
            year,
            label: fiscal_year_label(year),
            average_inflation: inflation,
            months: 0,
        })
        .collect();

    let next = &projected[KPI_HORIZON - 1];
    let outlook = WpiOutlook {
        year: next.year,
        inflation: next.average_inflation,
    };
    let status = if outlook.inflation > WPI_ALERT_INFLATION {
        Status::Pressure
    } else {
        Status::Stable
    };

    Some(WpiForecast {
        forecast_line: forecast_line(&history, projected),
        history,
        monthly,
        outlook,
        trend,
        status,
    })
}
