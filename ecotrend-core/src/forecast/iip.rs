//! Industrial production forecast from the monthly General IIP index.

use super::{forecast_line, LineRow, Status, IIP_HORIZON};
use crate::aggregate::percent_change;
use crate::normalize::{normalize_monthly, MonthlyRow};
use crate::period::{month_label, next_fiscal_month};
use crate::record::{fields, RawRecord};
use crate::thresholds::IIP_WINDOW_MONTHS;
use crate::trend::{project, trailing, LinearTrend};
use serde::{Deserialize, Serialize};

/// Category and sub-category of the headline index.
pub const GENERAL: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IipMonth {
    pub year: i32,
    pub month_order: u8,
    pub label: String,
    pub index: f64,
    /// Percent change over the previous month.
    pub growth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IipForecast {
    pub history: Vec<IipMonth>,
    pub forecast_line: Vec<LineRow<IipMonth>>,
    /// Change (%) from the last actual index to the final projected month.
    pub projected_growth: f64,
    /// Mean month-on-month change (%) across the projected months.
    pub avg_monthly_growth: f64,
    pub trend: Option<LinearTrend>,
    /// True when too few points were available to fit a trend.
    pub fallback: bool,
    pub status: Status,
}

impl IipForecast {
    /// Observed month-on-month growth rates in order, skipping gaps.
    pub fn growth_rates(&self) -> Vec<f64> {
        self.history.iter().filter_map(|m| m.growth).collect()
    }

    /// Growth rates split into contiguous runs. A month without a rate (the
    /// first month, or one following a zero index) ends the current run, so
    /// streaks never bridge a gap.
    pub fn growth_runs(&self) -> Vec<Vec<f64>> {
        let mut runs: Vec<Vec<f64>> = Vec::new();
        let mut current = Vec::new();
        for month in &self.history {
            match month.growth {
                Some(rate) => current.push(rate),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

fn is_general(row: &MonthlyRow) -> bool {
    let matches = |name| {
        row.field(name)
            .is_some_and(|v| v.eq_ignore_ascii_case(GENERAL))
    };
    matches(fields::CATEGORY) && matches(fields::SUB_CATEGORY)
}

/// The General/General monthly series with growth attached.
pub fn iip_history(records: &[RawRecord]) -> Vec<IipMonth> {
    let rows: Vec<MonthlyRow> = normalize_monthly(
        records,
        fields::VALUE,
        &[fields::CATEGORY, fields::SUB_CATEGORY],
    )
    .into_rows()
    .into_iter()
    .filter(is_general)
    .collect();

    let mut previous: Option<f64> = None;
    rows.into_iter()
        .map(|row| {
            let growth = previous.and_then(|p| percent_change(p, row.value));
            previous = Some(row.value);
            IipMonth {
                year: row.year,
                month_order: row.month_order,
                label: row.period_label,
                index: row.value,
                growth,
            }
        })
        .collect()
}

/// Forecast the General IIP six months ahead.
///
/// Fits on up to the last 60 months with x as sequential position. With
/// fewer than two usable months the projection is flat and both growth
/// figures are zero.
pub fn build_iip_forecast(records: &[RawRecord]) -> Option<IipForecast> {
    let full = iip_history(records);
    let history = trailing(&full, IIP_WINDOW_MONTHS).to_vec();
    let last = history.last()?;

    let points: Vec<(f64, f64)> = history
        .iter()
        .enumerate()
        .map(|(i, m)| (i as f64, m.index))
        .collect();
    let trend = LinearTrend::fit(&points);
    let fallback = trend.is_none();

    let xs: Vec<f64> = (0..IIP_HORIZON)
        .map(|step| (history.len() + step) as f64)
        .collect();
    let values = project(trend.as_ref(), last.index, &xs);

    let mut period = (last.year, last.month_order);
    let mut previous = last.index;
    let mut steps = Vec::with_capacity(IIP_HORIZON);
    let mut projected = Vec::with_capacity(IIP_HORIZON);
    for index in values {
        period = next_fiscal_month(period.0, period.1);
        let growth = percent_change(previous, index);
        if let Some(g) = growth {
            steps.push(g);
        }
        previous = index;
        projected.push(IipMonth {
            year: period.0,
            month_order: period.1,
            label: month_label(period.0, period.1),
            index,
            growth,
        });
    }

    let (projected_growth, avg_monthly_growth) = if fallback {
        (0.0, 0.0)
    } else {
        let total = percent_change(last.index, previous).unwrap_or(0.0);
        let mean = if steps.is_empty() {
            0.0
        } else {
            steps.iter().sum::<f64>() / steps.len() as f64
        };
        (total, mean)
    };

    let status = if projected_growth < 0.0 {
        Status::Pressure
    } else {
        Status::Stable
    };

    tracing::debug!(
        months = history.len(),
        fallback,
        projected_growth,
        "built IIP forecast"
    );

    Some(IipForecast {
        forecast_line: forecast_line(&history, projected),
        history,
        projected_growth,
        avg_monthly_growth,
        trend,
        fallback,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn general(year: &str, month: &str, value: f64) -> RawRecord {
        RawRecord::from(json!({
            "year": year,
            "month": month,
            "category": "General",
            "sub_category": "General",
            "value": value,
        }))
    }

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "actual={actual}, expected={expected}"
        );
    }

    #[test]
    fn filters_to_general_index() {
        let records = vec![
            general("2022-23", "April", 100.0),
            RawRecord::from(json!({
                "year": "2022-23", "month": "May", "category": "Sectoral",
                "sub_category": "Mining", "value": 90,
            })),
            RawRecord::from(json!({
                "year": "2022-23", "month": "June", "category": "General",
                "sub_category": "Manufacturing", "value": 95,
            })),
        ];
        assert_eq!(iip_history(&records).len(), 1);
    }

    #[test]
    fn growth_is_month_on_month() {
        let records = vec![
            general("2022-23", "May", 110.0),
            general("2022-23", "April", 100.0),
        ];
        let history = iip_history(&records);
        assert_eq!(history[0].growth, None);
        assert_approx(history[1].growth.unwrap(), 10.0);
    }

    #[test]
    fn zero_index_splits_growth_runs() {
        let records: Vec<RawRecord> = [
            ("April", 110.0),
            ("May", 100.0),
            ("June", 0.0),
            ("July", 95.0),
            ("August", 90.0),
        ]
        .iter()
        .map(|&(month, v)| general("2022-23", month, v))
        .collect();
        let forecast = build_iip_forecast(&records).unwrap();
        // July has no growth: the previous index is zero.
        assert_eq!(forecast.growth_rates().len(), 3);
        let runs = forecast.growth_runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1].len(), 1);
        assert!(runs.iter().flatten().all(|r| *r < 0.0));
    }

    #[test]
    fn single_point_projects_flat() {
        let forecast = build_iip_forecast(&[general("2023-24", "February", 140.0)]).unwrap();
        assert!(forecast.fallback);
        assert_eq!(forecast.projected_growth, 0.0);
        assert_eq!(forecast.avg_monthly_growth, 0.0);
        let projected: Vec<&IipMonth> = forecast
            .forecast_line
            .iter()
            .filter(|r| r.projected)
            .map(|r| &r.row)
            .collect();
        assert_eq!(projected.len(), IIP_HORIZON);
        assert!(projected.iter().all(|m| m.index == 140.0));
        // February 2024 rolls into the next fiscal year after March.
        assert_eq!(projected[0].label, "March 2024");
        assert_eq!(projected[1].label, "April 2024");
        assert_eq!(projected[1].year, 2024);
        assert_eq!(forecast.status, Status::Stable);
    }

    #[test]
    fn rising_index_projects_growth() {
        let records = vec![
            general("2022-23", "April", 100.0),
            general("2022-23", "May", 102.0),
            general("2022-23", "June", 104.0),
        ];
        let forecast = build_iip_forecast(&records).unwrap();
        assert!(!forecast.fallback);
        // Positions 3..=8 give 106..=116.
        assert_approx(forecast.projected_growth, 12.0 / 104.0 * 100.0);
        assert!(forecast.avg_monthly_growth > 0.0);
        assert_eq!(forecast.status, Status::Stable);
        assert_eq!(forecast.growth_rates().len(), 2);
    }

    #[test]
    fn falling_index_is_pressure() {
        let records = vec![
            general("2022-23", "April", 104.0),
            general("2022-23", "May", 102.0),
            general("2022-23", "June", 100.0),
        ];
        let forecast = build_iip_forecast(&records).unwrap();
        assert!(forecast.projected_growth < 0.0);
        assert_eq!(forecast.status, Status::Pressure);
    }

    #[test]
    fn window_keeps_last_sixty_months() {
        let names = [
            "April", "May", "June", "July", "August", "September", "October", "November",
            "December", "January", "February", "March",
        ];
        let mut records = Vec::new();
        for year in 2015..2022 {
            for (i, name) in names.iter().enumerate() {
                let label = format!("{year}-{:02}", (year + 1) % 100);
                records.push(general(&label, name, 100.0 + i as f64));
            }
        }
        let forecast = build_iip_forecast(&records).unwrap();
        assert_eq!(forecast.history.len(), IIP_WINDOW_MONTHS);
    }

    #[test]
    fn no_general_rows_has_no_forecast() {
        assert!(build_iip_forecast(&[]).is_none());
    }
}
