//! Dashboard loading: concurrent fetch, sequential build, alert assembly.
//!
//! All five domain fetches fire at once on the rayon pool and are collected
//! together. The pure builders then run in sequence. Each domain lands in its
//! own [`Slot`], so one failed feed leaves the other forecasts intact;
//! [`load_dashboard_strict`] keeps the all-or-nothing behavior instead.

use crate::source::{Domain, RecordSource, SourceError};
use ecotrend_core::forecast::{
    build_accounts_forecast, build_commodity_forecasts, build_energy_forecast,
    build_iip_forecast, build_wpi_forecast, AccountsForecast, Aggregate, EnergyForecast,
    IipForecast, WpiForecast,
};
use ecotrend_core::normalize::{normalize_annual, normalize_monthly};
use ecotrend_core::record::fields;
use ecotrend_core::risk::{
    detect_energy_risk, detect_entity_risks, detect_gdp_risk, detect_iip_risk, detect_wpi_risk,
    RiskAlert,
};
use ecotrend_core::RawRecord;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from a strict load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch {domain} records: {source}")]
    Fetch {
        domain: Domain,
        #[source]
        source: SourceError,
    },
}

/// Outcome of one domain's load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "forecast", rename_all = "snake_case")]
pub enum Slot<T> {
    Ready(T),
    /// Fetched, but no usable rows survived normalization.
    Unavailable,
    Failed {
        reason: String,
    },
}

impl<T> Slot<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    fn from_build(built: Option<T>) -> Self {
        built.map_or(Slot::Unavailable, Slot::Ready)
    }
}

/// Aggregate energy forecast plus one forecast per commodity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyPanel {
    pub aggregate: EnergyForecast,
    pub commodities: BTreeMap<String, EnergyForecast>,
}

/// Row counts for one fetched domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomainCounts {
    pub fetched: usize,
    /// Rows with a resolvable period and a finite value.
    pub accepted: usize,
    pub dropped: usize,
}

/// Every domain's forecast, built from one fetch round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub energy: Slot<EnergyPanel>,
    pub gdp: Slot<AccountsForecast>,
    pub gfcf: Slot<AccountsForecast>,
    pub wpi: Slot<WpiForecast>,
    pub iip: Slot<IipForecast>,
    /// Counts for the domains that were fetched successfully.
    pub diagnostics: BTreeMap<Domain, DomainCounts>,
    /// BLAKE3 over every domain's records, for debouncing repeated alerts.
    pub input_hash: String,
}

impl Dashboard {
    /// Every rule's alerts in fixed order: GDP, energy aggregate,
    /// per-commodity energy, WPI, IIP.
    pub fn alerts(&self) -> Vec<RiskAlert> {
        let mut alerts = Vec::new();

        if let Some(growth) = self.gdp.ready().and_then(|f| f.latest_growth()) {
            alerts.extend(detect_gdp_risk(growth));
        }

        if let Some(energy) = self.energy.ready() {
            alerts.extend(energy.aggregate.latest().and_then(detect_energy_risk));
            for (commodity, forecast) in &energy.commodities {
                alerts.extend(detect_entity_risks(
                    commodity,
                    &forecast.history,
                    forecast.outlook.ratio,
                ));
            }
        }

        if let Some(inflation) = self.wpi.ready().and_then(|f| f.latest_inflation()) {
            alerts.extend(detect_wpi_risk(inflation));
        }

        if let Some(iip) = self.iip.ready() {
            // Most recent qualifying run; gaps in the index reset the streak.
            alerts.extend(
                iip.growth_runs()
                    .iter()
                    .rev()
                    .find_map(|run| detect_iip_risk(run)),
            );
        }

        alerts
    }

    /// One domain's slot as JSON.
    pub fn domain_json(&self, domain: Domain) -> serde_json::Result<serde_json::Value> {
        match domain {
            Domain::Energy => serde_json::to_value(&self.energy),
            Domain::Gdp => serde_json::to_value(&self.gdp),
            Domain::Gfcf => serde_json::to_value(&self.gfcf),
            Domain::Wpi => serde_json::to_value(&self.wpi),
            Domain::Iip => serde_json::to_value(&self.iip),
        }
    }

    /// Number of domains whose forecast is ready.
    pub fn ready_count(&self) -> usize {
        [
            self.energy.is_ready(),
            self.gdp.is_ready(),
            self.gfcf.is_ready(),
            self.wpi.is_ready(),
            self.iip.is_ready(),
        ]
        .into_iter()
        .filter(|ready| *ready)
        .count()
    }
}

type Fetched = Vec<(Domain, Result<Vec<RawRecord>, SourceError>)>;

/// Fire every domain fetch concurrently, then collect all results in domain order.
fn fetch_all(source: &dyn RecordSource) -> Fetched {
    Domain::ALL
        .par_iter()
        .map(|&domain| {
            let result = source.fetch(domain);
            match &result {
                Ok(records) => tracing::info!(
                    source = source.name(),
                    %domain,
                    records = records.len(),
                    "fetched records"
                ),
                Err(e) => tracing::warn!(source = source.name(), %domain, error = %e, "fetch failed"),
            }
            (domain, result)
        })
        .collect()
}

/// Load every domain, keeping whatever succeeds.
pub fn load_dashboard(source: &dyn RecordSource) -> Dashboard {
    build_dashboard(fetch_all(source))
}

/// Load every domain, failing on the first fetch error in domain order.
pub fn load_dashboard_strict(source: &dyn RecordSource) -> Result<Dashboard, LoadError> {
    let fetched = fetch_all(source);
    let mut ok = Vec::with_capacity(fetched.len());
    for (domain, result) in fetched {
        match result {
            Ok(records) => ok.push((domain, Ok(records))),
            Err(source) => return Err(LoadError::Fetch { domain, source }),
        }
    }
    Ok(build_dashboard(ok))
}

fn build_dashboard(fetched: Fetched) -> Dashboard {
    let input_hash = compute_input_hash(&fetched);

    let mut feeds: BTreeMap<Domain, Result<Vec<RawRecord>, String>> = BTreeMap::new();
    let mut diagnostics = BTreeMap::new();
    for (domain, result) in fetched {
        match result {
            Ok(records) => {
                diagnostics.insert(domain, count_rows(domain, &records));
                feeds.insert(domain, Ok(records));
            }
            Err(e) => {
                feeds.insert(domain, Err(e.to_string()));
            }
        }
    }

    let slot = |domain: Domain| feeds.get(&domain).map(|r| r.as_ref());

    let dashboard = Dashboard {
        energy: build_slot(slot(Domain::Energy), |records| {
            build_energy_forecast(records).map(|aggregate| EnergyPanel {
                aggregate,
                commodities: build_commodity_forecasts(records),
            })
        }),
        gdp: build_slot(slot(Domain::Gdp), |records| {
            build_accounts_forecast(records, Aggregate::Gdp)
        }),
        gfcf: build_slot(slot(Domain::Gfcf), |records| {
            build_accounts_forecast(records, Aggregate::Gfcf)
        }),
        wpi: build_slot(slot(Domain::Wpi), build_wpi_forecast),
        iip: build_slot(slot(Domain::Iip), build_iip_forecast),
        diagnostics,
        input_hash,
    };

    tracing::info!(
        ready = dashboard.ready_count(),
        hash = %dashboard.input_hash,
        "dashboard built"
    );
    dashboard
}

fn build_slot<T>(
    feed: Option<Result<&Vec<RawRecord>, &String>>,
    build: impl FnOnce(&[RawRecord]) -> Option<T>,
) -> Slot<T> {
    match feed {
        Some(Ok(records)) => Slot::from_build(build(records.as_slice())),
        Some(Err(reason)) => Slot::Failed {
            reason: reason.clone(),
        },
        None => Slot::Unavailable,
    }
}

fn count_rows(domain: Domain, records: &[RawRecord]) -> DomainCounts {
    let (accepted, dropped) = match domain {
        Domain::Energy | Domain::Gdp | Domain::Gfcf => {
            let n = normalize_annual(records, fields::VALUE, &[]);
            (n.accepted(), n.dropped)
        }
        Domain::Wpi | Domain::Iip => {
            let n = normalize_monthly(records, fields::VALUE, &[]);
            (n.accepted(), n.dropped)
        }
    };
    DomainCounts {
        fetched: records.len(),
        accepted,
        dropped,
    }
}

/// Deterministic BLAKE3 hash over every domain's records.
///
/// Domains are hashed in [`Domain::ALL`] order and records as canonical JSON
/// (object keys sorted), so identical inputs give identical hashes.
fn compute_input_hash(fetched: &Fetched) -> String {
    let mut hasher = blake3::Hasher::new();

    for domain in Domain::ALL {
        hasher.update(domain.as_str().as_bytes());
        match fetched.iter().find(|(d, _)| *d == domain).map(|(_, r)| r) {
            Some(Ok(records)) => {
                if let Err(e) = serde_json::to_writer(&mut hasher, records) {
                    tracing::warn!(%domain, error = %e, "could not hash records");
                }
            }
            Some(Err(_)) => {
                hasher.update(b"<failed>");
            }
            None => {
                hasher.update(b"<missing>");
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<RawRecord> {
        values.into_iter().map(RawRecord::from).collect()
    }

    fn gdp_records() -> Vec<RawRecord> {
        records(vec![
            json!({"year": "2022-23", "revision": "PE", "value": 100.0}),
            json!({"year": "2023-24", "revision": "PE", "value": 103.0}),
            json!({"year": "bogus", "value": 1}),
        ])
    }

    #[test]
    fn failed_domain_keeps_the_others() {
        let source = MemorySource::new()
            .with_records(Domain::Gdp, gdp_records())
            .with_failure(Domain::Wpi, "upstream 503");
        let dashboard = load_dashboard(&source);

        assert!(dashboard.gdp.is_ready());
        assert_eq!(dashboard.energy, Slot::Unavailable);
        assert!(matches!(&dashboard.wpi, Slot::Failed { reason } if reason.contains("503")));
        assert!(!dashboard.diagnostics.contains_key(&Domain::Wpi));
        assert_eq!(
            dashboard.diagnostics[&Domain::Gdp],
            DomainCounts {
                fetched: 3,
                accepted: 2,
                dropped: 1
            }
        );
    }

    #[test]
    fn strict_load_fails_on_first_error() {
        let source = MemorySource::new()
            .with_failure(Domain::Iip, "down")
            .with_failure(Domain::Gdp, "down");
        let err = load_dashboard_strict(&source).unwrap_err();
        assert!(matches!(err, LoadError::Fetch { domain: Domain::Gdp, .. }));
    }

    #[test]
    fn gdp_slowdown_alert_is_first() {
        let source = MemorySource::new()
            .with_records(Domain::Gdp, gdp_records())
            .with_records(
                Domain::Energy,
                records(vec![
                    json!({"year": "2023-24", "commodity": "Coal", "indicator": "Supply", "value": 80}),
                    json!({"year": "2023-24", "commodity": "Coal", "indicator": "Consumption", "value": 100}),
                ]),
            );
        let alerts = load_dashboard(&source).alerts();
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["gdp-slowdown", "energy-deficit", "energy-deficit-coal"]);
    }

    #[test]
    fn iip_streak_resets_at_zero_index() {
        let iip = |values: &[(&str, f64)]| {
            records(
                values
                    .iter()
                    .map(|&(month, v)| {
                        json!({"year": "2022-23", "month": month, "category": "General",
                               "sub_category": "General", "value": v})
                    })
                    .collect(),
            )
        };
        // Two falls, a zero index, then two more falls: no run reaches three.
        let gapped = iip(&[
            ("April", 110.0),
            ("May", 100.0),
            ("June", 0.0),
            ("July", 95.0),
            ("August", 90.0),
            ("September", 85.0),
        ]);
        let alerts = load_dashboard(&MemorySource::new().with_records(Domain::Iip, gapped)).alerts();
        assert!(alerts.is_empty(), "{alerts:?}");

        let falling = iip(&[
            ("April", 110.0),
            ("May", 100.0),
            ("June", 0.0),
            ("July", 95.0),
            ("August", 90.0),
            ("September", 85.0),
            ("October", 80.0),
        ]);
        let alerts = load_dashboard(&MemorySource::new().with_records(Domain::Iip, falling)).alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "iip-stress");
        assert!(alerts[0].message.contains("3 consecutive"));
    }

    #[test]
    fn input_hash_tracks_content() {
        let a = MemorySource::new().with_records(Domain::Gdp, gdp_records());
        let b = MemorySource::new().with_records(Domain::Gdp, gdp_records()[..2].to_vec());
        let first = load_dashboard(&a);
        assert_eq!(first.input_hash, load_dashboard(&a).input_hash);
        assert_ne!(first.input_hash, load_dashboard(&b).input_hash);
        assert_eq!(first.input_hash.len(), 64);
    }

    #[test]
    fn domain_json_tags_slot_state() {
        let dashboard = load_dashboard(&MemorySource::new().with_records(Domain::Gdp, gdp_records()));
        assert_eq!(dashboard.domain_json(Domain::Gdp).unwrap()["state"], "ready");
        assert_eq!(dashboard.domain_json(Domain::Iip).unwrap()["state"], "unavailable");
    }
}
