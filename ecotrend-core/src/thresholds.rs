//! Fixed thresholds shared by forecast status labels and risk rules.
//!
//! These are output-compatibility constants, not configuration.

/// GDP/GFCF growth (%) below which the economy is flagged as slowing.
pub const GDP_SLOWDOWN_GROWTH: f64 = 4.0;

/// Supply/consumption ratio below which a deficit is reported.
pub const ENERGY_DEFICIT_RATIO: f64 = 1.0;

/// Projected supply/consumption below this ratio marks the outlook as pressure.
pub const ENERGY_PRESSURE_RATIO: f64 = 0.95;

/// Projected supply/consumption above this ratio marks the outlook as surplus.
pub const ENERGY_SURPLUS_RATIO: f64 = 1.05;

/// Annual WPI inflation (%) above which an inflation alert fires.
pub const WPI_ALERT_INFLATION: f64 = 6.0;

/// Consecutive months of negative IIP growth that signal industrial stress.
pub const IIP_STRESS_STREAK: usize = 3;

/// Most recent monthly IIP points used for the trend fit.
pub const IIP_WINDOW_MONTHS: usize = 60;

/// Year-over-year supply change (%) considered high volatility.
pub const SUPPLY_VOLATILITY_PCT: f64 = 15.0;

/// Trailing window (years) inspected for a declining supply trend.
pub const DECLINE_WINDOW_YEARS: usize = 5;
