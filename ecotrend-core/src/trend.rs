//! Ordinary-least-squares trend model.
//!
//! Closed-form fit from the normal equations over `(x, y)` points. There is
//! no bounds checking on [`LinearTrend::predict`]: projecting far beyond the
//! observed range is allowed and returns whatever the line gives, including
//! negative values for declining series.

use serde::{Deserialize, Serialize};

/// Maximum number of trailing periods used when fitting a trend.
pub const TREND_WINDOW: usize = 10;

/// A fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fit an OLS line to `(x, y)` points.
    ///
    /// Returns `None` for fewer than two points, or when every x is the same
    /// (the denominator `n·Σx² − (Σx)²` is zero).
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
        for &(x, y) in points {
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_xx += x * x;
        }

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator == 0.0 {
            return None;
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        Some(Self { slope, intercept })
    }

    /// Evaluate the line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// The last `n` items of an ascending series (all of them if shorter).
pub fn trailing<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Evaluate `model` at each x, or repeat `last_value` when there is no model.
pub fn project(model: Option<&LinearTrend>, last_value: f64, xs: &[f64]) -> Vec<f64> {
    match model {
        Some(m) => xs.iter().map(|&x| m.predict(x)).collect(),
        None => vec![last_value; xs.len()],
    }
}
