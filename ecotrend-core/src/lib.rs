//! EcoTrend Core — normalization, aggregation, trend models, forecasts, risk rules.
//!
//! This crate is the pure engine behind the economic dashboard:
//! - Raw records with loosely-typed fields ([`record::RawRecord`])
//! - Numeric coercion and fiscal period resolution
//! - Normalization into typed, sorted annual and monthly rows
//! - Period aggregation and ratio helpers
//! - OLS trend fitting with flat fallback
//! - Per-domain forecast builders (energy, GDP/GFCF, WPI, IIP)
//! - Threshold risk rules producing structured alerts
//!
//! Nothing here performs I/O. Fetching records is the runner's job.

pub mod aggregate;
pub mod coerce;
pub mod forecast;
pub mod normalize;
pub mod period;
pub mod record;
pub mod risk;
pub mod thresholds;
pub mod trend;

pub use forecast::{Status, CHART_HORIZON, IIP_HORIZON, KPI_HORIZON};
pub use record::RawRecord;
pub use risk::{RiskAlert, Severity};
pub use trend::LinearTrend;
