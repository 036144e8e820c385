//! Threshold risk rules over the latest actual and projected values.
//!
//! Every rule is a pure function of its inputs. Alerts are recomputed on each
//! evaluation; repeated identical alerts are the caller's to debounce.

use crate::aggregate::percent_change;
use crate::forecast::EnergyYear;
use crate::trend::trailing;
use serde::{Deserialize, Serialize};

pub use crate::thresholds::{
    DECLINE_WINDOW_YEARS, ENERGY_DEFICIT_RATIO, GDP_SLOWDOWN_GROWTH, IIP_STRESS_STREAK,
    SUPPLY_VOLATILITY_PCT, WPI_ALERT_INFLATION,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

/// A structured alert. `id` is stable for a given rule and entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl RiskAlert {
    fn new(
        id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        message: String,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            title: title.into(),
            message,
        }
    }
}

// ── Domain rules ────────────────────────────────────────────────────

/// Growth below the slowdown threshold.
pub fn detect_gdp_risk(growth: f64) -> Option<RiskAlert> {
    (growth < GDP_SLOWDOWN_GROWTH).then(|| {
        RiskAlert::new(
            "gdp-slowdown",
            Severity::Warning,
            "Economic Slowdown",
            format!("GDP growth at {growth:.1}% is below the {GDP_SLOWDOWN_GROWTH:.1}% threshold"),
        )
    })
}

/// Aggregate supply falling short of consumption. An absent ratio never alerts.
pub fn detect_energy_risk(latest: &EnergyYear) -> Option<RiskAlert> {
    let ratio = latest.ratio.filter(|r| *r < ENERGY_DEFICIT_RATIO)?;
    Some(RiskAlert::new(
        "energy-deficit",
        Severity::Danger,
        "Energy Deficit",
        format!(
            "Supply/consumption ratio {ratio:.2} in {} means demand exceeds supply",
            latest.label
        ),
    ))
}

/// Annual inflation above the alert threshold.
pub fn detect_wpi_risk(inflation: f64) -> Option<RiskAlert> {
    (inflation > WPI_ALERT_INFLATION).then(|| {
        RiskAlert::new(
            "wpi-inflation",
            Severity::Danger,
            "Inflation Alert",
            format!(
                "Wholesale inflation at {inflation:.1}% exceeds the {WPI_ALERT_INFLATION:.1}% threshold"
            ),
        )
    })
}

/// Three or more consecutive months of negative growth anywhere in the series.
pub fn detect_iip_risk(growth_rates: &[f64]) -> Option<RiskAlert> {
    let mut streak = 0usize;
    let mut longest = 0usize;
    for &rate in growth_rates {
        if rate < 0.0 {
            streak += 1;
            longest = longest.max(streak);
        } else {
            streak = 0;
        }
    }

    (longest >= IIP_STRESS_STREAK).then(|| {
        RiskAlert::new(
            "iip-stress",
            Severity::Warning,
            "Industrial Stress",
            format!("Industrial output contracted for {longest} consecutive months"),
        )
    })
}

// ── Per-entity rules ────────────────────────────────────────────────

/// Deficit, declining-trend and volatility rules for one entity's balance.
///
/// `history` is the entity's ascending yearly series; `projected_ratio` is
/// its next-year projected supply/consumption ratio. Rules are independent,
/// so up to three alerts are returned.
pub fn detect_entity_risks(
    entity: &str,
    history: &[EnergyYear],
    projected_ratio: Option<f64>,
) -> Vec<RiskAlert> {
    let slug = slugify(entity);
    let mut alerts = Vec::new();

    let current = history.last().and_then(|y| y.ratio);
    let deficit = current
        .filter(|r| *r < ENERGY_DEFICIT_RATIO)
        .map(|r| (r, "current"))
        .or_else(|| {
            projected_ratio
                .filter(|r| *r < ENERGY_DEFICIT_RATIO)
                .map(|r| (r, "projected"))
        });
    if let Some((ratio, basis)) = deficit {
        alerts.push(RiskAlert::new(
            format!("energy-deficit-{slug}"),
            Severity::Danger,
            format!("{entity} Deficit"),
            format!("{entity} {basis} supply/consumption ratio is {ratio:.2}"),
        ));
    }

    let window = trailing(history, DECLINE_WINDOW_YEARS);
    if let (Some(first), Some(last)) = (window.first(), window.last()) {
        if window.len() >= 2 && first.supply > last.supply {
            let decline = percent_change(first.supply, last.supply).map_or(0.0, |c| -c);
            alerts.push(RiskAlert::new(
                format!("energy-decline-{slug}"),
                Severity::Warning,
                format!("{entity} Declining Supply"),
                format!(
                    "{entity} supply fell {decline:.1}% between {} and {}",
                    first.label, last.label
                ),
            ));
        }
    }

    let swing = history.windows(2).find_map(|pair| {
        percent_change(pair[0].supply, pair[1].supply)
            .filter(|c| c.abs() >= SUPPLY_VOLATILITY_PCT)
            .map(|c| (c, &pair[1].label))
    });
    if let Some((change, label)) = swing {
        let direction = if change < 0.0 { "dropped" } else { "jumped" };
        alerts.push(RiskAlert::new(
            format!("energy-volatility-{slug}"),
            Severity::Warning,
            format!("{entity} Supply Volatility"),
            format!("{entity} supply {direction} {:.1}% in {label}", change.abs()),
        ));
    }

    alerts
}

/// Lowercase ASCII alphanumerics joined by single dashes.
///
/// Names with no ASCII alphanumerics fall back to `entity-` plus the first
/// 16 hex digits of the name's BLAKE3 hash, so the id is never empty.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        let hash = blake3::hash(name.trim().as_bytes()).to_hex();
        slug = format!("entity-{}", &hash.as_str()[..16]);
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(y: i32, supply: f64, consumption: f64) -> EnergyYear {
        EnergyYear {
            year: y,
            label: format!("{y}-{:02}", (y + 1) % 100),
            supply,
            consumption,
            ratio: crate::aggregate::ratio(supply, consumption),
        }
    }

    fn series(supply: &[f64], consumption: &[f64]) -> Vec<EnergyYear> {
        supply
            .iter()
            .zip(consumption)
            .enumerate()
            .map(|(i, (&s, &c))| year(2020 + i as i32, s, c))
            .collect()
    }

    #[test]
    fn gdp_slowdown_mentions_growth() {
        let alert = detect_gdp_risk(3.2).unwrap();
        assert_eq!(alert.id, "gdp-slowdown");
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.title, "Economic Slowdown");
        assert!(alert.message.contains("3.2%"));
        assert!(detect_gdp_risk(GDP_SLOWDOWN_GROWTH).is_none());
    }

    #[test]
    fn energy_deficit_needs_a_ratio() {
        assert!(detect_energy_risk(&year(2022, 90.0, 100.0)).is_some());
        assert!(detect_energy_risk(&year(2022, 100.0, 100.0)).is_none());
        assert!(detect_energy_risk(&year(2022, 100.0, 0.0)).is_none());
    }

    #[test]
    fn wpi_threshold_is_strict() {
        assert!(detect_wpi_risk(WPI_ALERT_INFLATION).is_none());
        let alert = detect_wpi_risk(6.5).unwrap();
        assert_eq!(alert.severity, Severity::Danger);
        assert!(alert.message.contains("6.5%"));
    }

    #[test]
    fn iip_streak_must_be_consecutive() {
        assert!(detect_iip_risk(&[-1.0, -2.0, -0.5, 1.0, 2.0]).is_some());
        assert!(detect_iip_risk(&[-1.0, -2.0, 1.0, -0.5, -3.0]).is_none());
        assert!(detect_iip_risk(&[-1.0, -1.0, 0.0, -1.0]).is_none());
        assert!(detect_iip_risk(&[]).is_none());
    }

    #[test]
    fn entity_deficit_prefers_current_ratio() {
        let history = series(&[100.0, 95.0, 90.0], &[100.0, 105.0, 112.0]);
        let alerts = detect_entity_risks("Coal", &history, Some(0.5));
        let deficit = alerts
            .iter()
            .find(|a| a.id == "energy-deficit-coal")
            .unwrap();
        assert_eq!(deficit.severity, Severity::Danger);
        assert!(deficit.message.contains("0.80"));
    }

    #[test]
    fn entity_deficit_falls_back_to_projection() {
        let history = series(&[100.0], &[90.0]);
        let alerts = detect_entity_risks("Oil", &history, Some(0.9));
        assert!(alerts[0].message.contains("0.90"));
        assert!(detect_entity_risks("Oil", &history, Some(1.2)).is_empty());
    }

    #[test]
    fn declining_supply_over_trailing_window() {
        // Only the last five years count: 120 -> 90 is a 25% decline.
        let history = series(
            &[50.0, 120.0, 115.0, 110.0, 100.0, 90.0],
            &[10.0; 6],
        );
        let alerts = detect_entity_risks("Natural Gas", &history, None);
        let decline = alerts
            .iter()
            .find(|a| a.id == "energy-decline-natural-gas")
            .unwrap();
        assert!(decline.message.contains("25.0%"));
    }

    #[test]
    fn volatility_reports_first_swing() {
        let history = series(&[100.0, 100.0, 130.0], &[1.0; 3]);
        let alerts = detect_entity_risks("Coal", &history, None);
        let volatility = alerts
            .iter()
            .find(|a| a.id == "energy-volatility-coal")
            .unwrap();
        assert!(volatility.message.contains("30.0%"));

        let calm = series(&[100.0, 105.0, 108.0], &[1.0; 3]);
        assert!(detect_entity_risks("Coal", &calm, None).is_empty());
    }

    #[test]
    fn slugs_are_url_safe() {
        assert_eq!(slugify("Natural Gas"), "natural-gas");
        assert_eq!(slugify("  Crude Oil (Total) "), "crude-oil-total");
        assert_eq!(slugify("Coal"), "coal");
    }

    #[test]
    fn non_ascii_names_get_hashed_slugs() {
        let coal = slugify("कोयला");
        assert!(coal.starts_with("entity-"));
        assert_eq!(coal.len(), "entity-".len() + 16);
        assert_eq!(coal, slugify("कोयला"));
        assert_ne!(coal, slugify("तेल"));

        let alerts = detect_entity_risks("कोयला", &series(&[80.0], &[100.0]), None);
        assert_eq!(alerts[0].id, format!("energy-deficit-{coal}"));
    }
}
