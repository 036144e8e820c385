//! Raw statistical records at the engine boundary.
//!
//! A `RawRecord` is the untyped key/value bag handed over by the fetch layer.
//! The engine only reads it; the normalizer is the single place where its
//! fields are converted into typed rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known field names across the statistical feeds.
pub mod fields {
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const VALUE: &str = "value";
    pub const COMMODITY: &str = "commodity";
    pub const SECTOR: &str = "sector";
    pub const CATEGORY: &str = "category";
    pub const SUB_CATEGORY: &str = "sub_category";
    pub const INDICATOR: &str = "indicator";
    pub const REVISION: &str = "revision";
    pub const GROWTH_RATE: &str = "growth_rate";
}

/// An immutable, untyped record from an external statistical source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw JSON value of a field.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field rendered as trimmed text.
    ///
    /// Strings are trimmed (blank strings count as absent) and numbers are
    /// rendered as their JSON text. Other JSON types are treated as absent.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Whether a field's text equals `expected`, ignoring ASCII case.
    pub fn text_eq(&self, field: &str, expected: &str) -> bool {
        self.text(field)
            .is_some_and(|t| t.eq_ignore_ascii_case(expected))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Build a record from a `serde_json::json!` object literal.
///
/// Non-object values produce an empty record.
impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_trims_and_renders_numbers() {
        let r = RawRecord::from(json!({
            "year": " 2022-23 ",
            "blank": "   ",
            "value": 12.5,
            "flag": true,
            "missing": null,
        }));
        assert_eq!(r.text("year").as_deref(), Some("2022-23"));
        assert_eq!(r.text("blank"), None);
        assert_eq!(r.text("value").as_deref(), Some("12.5"));
        assert_eq!(r.text("flag"), None);
        assert_eq!(r.text("missing"), None);
        assert_eq!(r.text("absent"), None);
    }

    #[test]
    fn text_eq_ignores_case() {
        let r = RawRecord::from(json!({"category": "General"}));
        assert!(r.text_eq("category", "general"));
        assert!(!r.text_eq("category", "Mining"));
        assert!(!r.text_eq("sub_category", "General"));
    }

    #[test]
    fn deserializes_transparently() {
        let records: Vec<RawRecord> =
            serde_json::from_str(r#"[{"year":"2021-22","value":"10"},{}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("value").as_deref(), Some("10"));
        assert!(records[1].is_empty());
    }

    #[test]
    fn non_object_values_become_empty() {
        assert!(RawRecord::from(json!([1, 2, 3])).is_empty());
    }
}
