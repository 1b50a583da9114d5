//! Loosely typed backend rows and the coercion rules applied to them.
//!
//! Rows arrive as JSON objects whose numeric columns may be numbers,
//! numeric strings, `null` or missing entirely. Everything is coerced to
//! `f64` here, once, so the rule engine only ever sees finite numbers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend timestamp format without a colon in the offset, e.g.
/// `2024-03-01T09:30:00+0000`.
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// One row of a source collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(Map<String, Value>);

impl RawRow {
    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Numeric column, `0.0` when absent or unparsable.
    pub fn number(&self, key: &str) -> f64 {
        self.0.get(key).map(coerce_f64).unwrap_or(0.0)
    }

    /// First non-zero numeric column among `keys`, mirroring the backend's
    /// `budget || daily_budget || lifetime_budget` fallback chains.
    pub fn first_number(&self, keys: &[&str]) -> f64 {
        keys.iter()
            .map(|key| self.number(key))
            .find(|value| *value != 0.0)
            .unwrap_or(0.0)
    }

    /// First non-empty text column among `keys`. Numeric ids are stringified.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// First parseable timestamp column among `keys`.
    pub fn timestamp(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        keys.iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_str).and_then(parse_timestamp))
    }
}

/// Coerce a JSON value to a finite `f64`, defaulting to `0.0`.
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse the timestamp shapes the backend emits: RFC 3339, the compact
/// `+0000` offset form, and bare dates (taken as UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, COMPACT_OFFSET_FORMAT) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
