//! EcoTrend CLI — forecast, alert and feed-check commands.
//!
//! Commands:
//! - `forecast` — load every feed and print the dashboard (or one domain) as JSON
//! - `alerts` — print the current risk alerts, one JSON object per line
//! - `check` — report fetched, accepted and dropped rows per domain
//!
//! Logs go to stderr and respect `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ecotrend_core::Status;
use ecotrend_runner::{
    load_dashboard, load_dashboard_strict, Dashboard, DashboardConfig, Domain, Slot,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ecotrend",
    about = "EcoTrend CLI — economic indicator forecasts and risk alerts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every feed and print the forecasts as pretty JSON.
    Forecast {
        /// Path to the dashboard TOML config.
        #[arg(long)]
        config: PathBuf,

        /// Print only this domain: energy, gdp, gfcf, wpi or iip.
        #[arg(long)]
        domain: Option<Domain>,

        /// Fail on the first feed error instead of reporting it per domain.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print risk alerts as JSON lines.
    Alerts {
        /// Path to the dashboard TOML config.
        #[arg(long)]
        config: PathBuf,
    },
    /// Report row counts per domain.
    Check {
        /// Path to the dashboard TOML config.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Forecast {
            config,
            domain,
            strict,
        } => run_forecast(&config, domain, strict),
        Commands::Alerts { config } => run_alerts(&config),
        Commands::Check { config } => run_check(&config),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load(config_path: &Path, strict: bool) -> Result<Dashboard> {
    let config = DashboardConfig::from_file(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let source = config.file_source();
    tracing::info!(dir = %config.sources.dir.display(), "loading dashboard");

    if strict || config.strict {
        Ok(load_dashboard_strict(&source)?)
    } else {
        Ok(load_dashboard(&source))
    }
}

fn run_forecast(config_path: &Path, domain: Option<Domain>, strict: bool) -> Result<()> {
    let dashboard = load(config_path, strict)?;

    let json = match domain {
        Some(d) => serde_json::to_string_pretty(&dashboard.domain_json(d)?)?,
        None => serde_json::to_string_pretty(&dashboard)?,
    };
    println!("{json}");
    Ok(())
}

fn run_alerts(config_path: &Path) -> Result<()> {
    let dashboard = load(config_path, false)?;
    let alerts = dashboard.alerts();
    for alert in &alerts {
        println!("{}", serde_json::to_string(alert)?);
    }
    tracing::info!(count = alerts.len(), hash = %dashboard.input_hash, "alerts evaluated");
    Ok(())
}

fn run_check(config_path: &Path) -> Result<()> {
    let dashboard = load(config_path, false)?;

    println!();
    println!("=== Feed Check ===");
    println!("{:<8}{:>10}{:>10}{:>10}  {}", "Domain", "Fetched", "Accepted", "Dropped", "Forecast");
    for domain in Domain::ALL {
        let state = slot_state(&dashboard, domain);
        match dashboard.diagnostics.get(&domain) {
            Some(c) => println!(
                "{:<8}{:>10}{:>10}{:>10}  {state}",
                domain.as_str(),
                c.fetched,
                c.accepted,
                c.dropped
            ),
            None => println!("{:<8}{:>10}{:>10}{:>10}  {state}", domain.as_str(), "-", "-", "-"),
        }
    }
    println!();
    println!("Input hash: {}", dashboard.input_hash);
    Ok(())
}

/// One-word slot summary: the forecast status, or why there is none.
fn slot_state(dashboard: &Dashboard, domain: Domain) -> String {
    fn describe<T>(slot: &Slot<T>, status: impl Fn(&T) -> Status) -> String {
        match slot {
            Slot::Ready(forecast) => status(forecast).to_string(),
            Slot::Unavailable => "no data".to_string(),
            Slot::Failed { reason } => format!("failed: {reason}"),
        }
    }

    match domain {
        Domain::Energy => describe(&dashboard.energy, |p| p.aggregate.status),
        Domain::Gdp => describe(&dashboard.gdp, |f| f.status),
        Domain::Gfcf => describe(&dashboard.gfcf, |f| f.status),
        Domain::Wpi => describe(&dashboard.wpi, |f| f.status),
        Domain::Iip => describe(&dashboard.iip, |f| f.status),
    }
}
