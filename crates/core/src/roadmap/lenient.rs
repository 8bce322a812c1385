//! Loose `deserialize_with` helpers for model-written roadmap fields.
//!
//! Models drift from the requested schema: numbers arrive as `"90 minutes"`,
//! lists as a single string, strings as numbers. These accept whatever JSON
//! value is present and fall back to the type's default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Leading decimal number of `s`, e.g. `"90 minutes"` -> 90.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

pub(super) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text(Value::deserialize(deserializer)?))
}

pub(super) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let n = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(&s),
        _ => None,
    };
    Ok(n.unwrap_or_default())
}

pub(super) fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(text).collect(),
        Value::Null => Vec::new(),
        single => vec![text(single)],
    })
}
