//! Dashboard configuration stored as TOML.
//!
//! ```toml
//! strict = false
//!
//! [sources]
//! dir = "data"
//!
//! [sources.files]
//! wpi = "wpi_monthly.csv"
//! ```

use crate::source::{Domain, FileSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Per-domain file names, relative to [`SourcesConfig::dir`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub energy: PathBuf,
    pub gdp: PathBuf,
    pub gfcf: PathBuf,
    pub wpi: PathBuf,
    pub iip: PathBuf,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            energy: Domain::Energy.default_file().into(),
            gdp: Domain::Gdp.default_file().into(),
            gfcf: Domain::Gfcf.default_file().into(),
            wpi: Domain::Wpi.default_file().into(),
            iip: Domain::Iip.default_file().into(),
        }
    }
}

impl SourceFiles {
    pub fn get(&self, domain: Domain) -> &Path {
        match domain {
            Domain::Energy => &self.energy,
            Domain::Gdp => &self.gdp,
            Domain::Gfcf => &self.gfcf,
            Domain::Wpi => &self.wpi,
            Domain::Iip => &self.iip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Directory holding the domain files.
    pub dir: PathBuf,
    pub files: SourceFiles,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            files: SourceFiles::default(),
        }
    }
}

/// The complete dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: SourcesConfig,
    /// Abort the whole load on the first fetch failure.
    pub strict: bool,
}

impl DashboardConfig {
    /// Load a configuration from a TOML file.
    ///
    /// A relative `sources.dir` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if config.sources.dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.sources.dir = parent.join(&config.sources.dir);
            }
        }
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// A file source reading the configured files.
    pub fn file_source(&self) -> FileSource {
        Domain::ALL
            .into_iter()
            .fold(FileSource::new(&self.sources.dir), |source, domain| {
                source.with_file(domain, self.sources.files.get(domain))
            })
    }
}
