// src/record.rs

//! The flat extraction record shared by the text parser and the formatter.
//!
//! OCR services encode per-item data in key names rather than nesting, so a
//! record is a single-level JSON object. Keys keep their insertion order,
//! which is also the order items are reported in.

use serde_json::{Map, Value};

pub type FlatRecord = Map<String, Value>;

/// Whether a value carries anything (not null, not a blank string).
pub fn is_defined(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Return the value of the first key in `keys` that is present and defined.
pub fn first_present<'a, S: AsRef<str>>(record: &'a FlatRecord, keys: &[S]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(k.as_ref()))
        .find(|v| is_defined(v))
}

/// Parse a numeric string, tolerating thousands separators and padding.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce any JSON value to a float: number as-is, numeric string parsed,
/// everything else 0.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_number(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Text form of a scalar value, trimmed; `None` for blanks and non-scalars.
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Upper-case a product name and reduce it to `[A-Z0-9_]` for use inside a key.
pub fn sanitize_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_uppercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
