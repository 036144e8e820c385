//! Numeric coercion for loosely-typed statistical values.
//!
//! Government feeds mix JSON numbers, numeric strings with thousands
//! separators, placeholders like `"NA"` or `"-"`, and nulls. Everything that
//! does not resolve to a finite `f64` becomes the NaN sentinel, which
//! downstream stages treat as "exclude this row".

use serde_json::Value;

/// Coerce an arbitrary JSON value into a finite number, or NaN.
///
/// Never panics. `null`, booleans, empty strings and non-numeric text all
/// yield NaN, as do parsed values that are infinite.
pub fn to_number(value: &Value) -> f64 {
    parse_number(value).unwrap_or(f64::NAN)
}

/// Same rule as [`to_number`], with the sentinel expressed as `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_text(s),
        _ => None,
    }
}

/// Parse a numeric string. Thousands separators are stripped first.
pub fn parse_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    // `f64::from_str` accepts "inf" and "NaN"; the finiteness check rejects them.
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(to_number(&json!(42)), 42.0);
        assert_eq!(to_number(&json!(-3.5)), -3.5);
        assert_eq!(to_number(&json!(0)), 0.0);
    }

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(to_number(&json!("12.5")), 12.5);
        assert_eq!(to_number(&json!("  7 ")), 7.0);
        assert_eq!(to_number(&json!("1,23,456.7")), 123456.7);
        assert_eq!(to_number(&json!("-0.25")), -0.25);
    }

    #[test]
    fn placeholders_become_nan() {
        for v in [
            json!(null),
            json!(""),
            json!("   "),
            json!("NA"),
            json!("-"),
            json!("n/a"),
            json!("inf"),
            json!("NaN"),
            json!(true),
            json!([1, 2]),
            json!({"v": 1}),
        ] {
            assert!(to_number(&v).is_nan(), "expected NaN for {v}");
            assert_eq!(parse_number(&v), None);
        }
    }
}
