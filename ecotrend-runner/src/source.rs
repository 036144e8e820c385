//! Record sources for the five dashboard domains.
//!
//! A source hands back raw, untyped records per domain. Everything past the
//! fetch (typing, filtering, forecasting) happens in `ecotrend-core`.

use ecotrend_core::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// A dashboard domain, one record feed each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Energy,
    Gdp,
    Gfcf,
    Wpi,
    Iip,
}

impl Domain {
    /// Every domain in fixed load and hash order.
    pub const ALL: [Domain; 5] = [
        Domain::Energy,
        Domain::Gdp,
        Domain::Gfcf,
        Domain::Wpi,
        Domain::Iip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Energy => "energy",
            Domain::Gdp => "gdp",
            Domain::Gfcf => "gfcf",
            Domain::Wpi => "wpi",
            Domain::Iip => "iip",
        }
    }

    /// File name a [`FileSource`] looks for when none is configured.
    pub fn default_file(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SourceError::UnknownDomain(s.to_string()))
    }
}

/// Errors from fetching a domain's records.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown domain '{0}' (expected one of energy, gdp, gfcf, wpi, iip)")]
    UnknownDomain(String),

    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse JSON {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: {reason}", path.display())]
    Shape { path: PathBuf, reason: String },

    #[error("{domain} feed unavailable: {reason}")]
    Unavailable { domain: Domain, reason: String },
}

/// Anything that can supply raw records for a domain.
///
/// Implementations are shared across rayon workers during a load.
pub trait RecordSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn fetch(&self, domain: Domain) -> Result<Vec<RawRecord>, SourceError>;
}

// ── File source ──────────────────────────────────────────────────────

/// Reads one file per domain from a directory.
///
/// `.csv` files need a header row and every cell is kept as a string.
/// Anything else is parsed as JSON: either an array of objects or an
/// object wrapping one under `"records"` or `"data"`.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
    files: BTreeMap<Domain, PathBuf>,
}

impl FileSource {
    /// A source reading `<domain>.json` files from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: BTreeMap::new(),
        }
    }

    /// Override the file used for one domain. Relative paths resolve against the directory.
    pub fn with_file(mut self, domain: Domain, file: impl Into<PathBuf>) -> Self {
        self.files.insert(domain, file.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolved path for a domain's file.
    pub fn path(&self, domain: Domain) -> PathBuf {
        match self.files.get(&domain) {
            Some(file) => self.dir.join(file),
            None => self.dir.join(domain.default_file()),
        }
    }
}

impl RecordSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self, domain: Domain) -> Result<Vec<RawRecord>, SourceError> {
        let path = self.path(domain);
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            read_csv(&path)
        } else {
            read_json(&path)
        }
    }
}

fn read_json(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    records_from_json(value).ok_or_else(|| SourceError::Shape {
        path: path.to_path_buf(),
        reason: "expected an array of records or an object with a \"records\" or \"data\" array"
            .into(),
    })
}

/// Unwrap a JSON document into records. Non-object array items become
/// empty records, which the normalizer drops.
pub fn records_from_json(value: Value) -> Option<Vec<RawRecord>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("records").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    Some(items.into_iter().map(RawRecord::from).collect())
}

/// Read a CSV feed. Cells that are not valid UTF-8 are decoded lossily so a
/// single mis-encoded row reaches the normalizer instead of failing the feed.
fn read_csv(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    let csv_err = |source| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_err)?;
    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut lossy = 0usize;
    for row in reader.byte_records() {
        let row = row.map_err(csv_err)?;
        if std::str::from_utf8(row.as_slice()).is_err() {
            lossy += 1;
        }
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(h, cell)| {
                    (
                        h.as_str(),
                        Value::String(String::from_utf8_lossy(cell).into_owned()),
                    )
                })
                .collect::<RawRecord>(),
        );
    }
    if lossy > 0 {
        tracing::warn!(path = %path.display(), rows = lossy, "decoded non-UTF-8 CSV rows lossily");
    }
    Ok(records)
}

// ── Memory source ────────────────────────────────────────────────────

/// In-memory records per domain.
///
/// A domain with neither records nor a failure yields an empty feed.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: BTreeMap<Domain, Vec<RawRecord>>,
    failures: BTreeMap<Domain, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, domain: Domain, records: Vec<RawRecord>) -> Self {
        self.records.insert(domain, records);
        self
    }

    /// Make every fetch of `domain` fail with `reason`.
    pub fn with_failure(mut self, domain: Domain, reason: impl Into<String>) -> Self {
        self.failures.insert(domain, reason.into());
        self
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, domain: Domain) -> Result<Vec<RawRecord>, SourceError> {
        if let Some(reason) = self.failures.get(&domain) {
            return Err(SourceError::Unavailable {
                domain,
                reason: reason.clone(),
            });
        }
        Ok(self.records.get(&domain).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn domain_parses_case_insensitively() {
        assert_eq!("GDP".parse::<Domain>().unwrap(), Domain::Gdp);
        assert_eq!(" iip ".parse::<Domain>().unwrap(), Domain::Iip);
        assert!(matches!(
            "cpi".parse::<Domain>(),
            Err(SourceError::UnknownDomain(_))
        ));
    }

    #[test]
    fn json_wrappers_are_unwrapped() {
        let direct = records_from_json(json!([{"year": "2020-21"}])).unwrap();
        let wrapped = records_from_json(json!({"records": [{"year": "2020-21"}]})).unwrap();
        let data = records_from_json(json!({"data": [{"year": "2020-21"}, 5]})).unwrap();
        assert_eq!(direct, wrapped);
        assert_eq!(data.len(), 2);
        assert!(data[1].is_empty());
        assert!(records_from_json(json!({"rows": []})).is_none());
        assert!(records_from_json(json!("nope")).is_none());
    }

    #[test]
    fn file_source_reads_json_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("gdp.json"),
            r#"[{"year": "2022-23", "revision": "PE", "value": 160.1}]"#,
        )
        .unwrap();
        let mut csv = std::fs::File::create(dir.path().join("wpi.csv")).unwrap();
        writeln!(csv, "year, month ,value").unwrap();
        writeln!(csv, "2022-23,April,151.2").unwrap();

        let source = FileSource::new(dir.path()).with_file(Domain::Wpi, "wpi.csv");
        let gdp = source.fetch(Domain::Gdp).unwrap();
        assert_eq!(gdp[0].text("revision").as_deref(), Some("PE"));

        let wpi = source.fetch(Domain::Wpi).unwrap();
        assert_eq!(wpi.len(), 1);
        assert_eq!(wpi[0].value("value"), Some(&json!("151.2")));
        assert_eq!(wpi[0].text("month").as_deref(), Some("April"));
    }

    #[test]
    fn csv_row_with_invalid_utf8_keeps_the_feed() {
        let dir = tempfile::tempdir().unwrap();
        let mut csv = std::fs::File::create(dir.path().join("wpi.csv")).unwrap();
        csv.write_all(b"year,month,commodity,value\n").unwrap();
        csv.write_all(b"2022-23,April,All commodities,150.0\n").unwrap();
        csv.write_all(b"2022-23,April,Caf\xE9,12.0\n").unwrap();
        csv.write_all(b"2022-23,May,All commodities,151.5\n").unwrap();
        drop(csv);

        let source = FileSource::new(dir.path()).with_file(Domain::Wpi, "wpi.csv");
        let wpi = source.fetch(Domain::Wpi).unwrap();
        assert_eq!(wpi.len(), 3);
        assert_eq!(wpi[1].text("commodity").as_deref(), Some("Caf\u{FFFD}"));
        assert_eq!(wpi[2].value("value"), Some(&json!("151.5")));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::new(dir.path()).fetch(Domain::Iip).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("iip.json"));
    }

    #[test]
    fn memory_source_failures() {
        let source = MemorySource::new()
            .with_records(Domain::Energy, vec![RawRecord::default()])
            .with_failure(Domain::Gdp, "timeout");
        assert_eq!(source.fetch(Domain::Energy).unwrap().len(), 1);
        assert!(source.fetch(Domain::Wpi).unwrap().is_empty());
        let err = source.fetch(Domain::Gdp).unwrap_err();
        assert_eq!(err.to_string(), "gdp feed unavailable: timeout");
    }
}
