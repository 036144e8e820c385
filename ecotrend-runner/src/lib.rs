//! EcoTrend Runner — record sources, configuration, concurrent dashboard load.
//!
//! This crate builds on `ecotrend-core` to provide:
//! - The `RecordSource` seam with file (JSON/CSV) and in-memory sources
//! - TOML dashboard configuration
//! - Concurrent five-domain fetch with per-domain result slots
//! - Alert assembly, row diagnostics and a BLAKE3 input fingerprint

pub mod config;
pub mod loader;
pub mod source;

pub use config::{ConfigError, DashboardConfig, SourceFiles, SourcesConfig};
pub use loader::{
    load_dashboard, load_dashboard_strict, Dashboard, DomainCounts, EnergyPanel, LoadError, Slot,
};
pub use source::{records_from_json, Domain, FileSource, MemorySource, RecordSource, SourceError};
