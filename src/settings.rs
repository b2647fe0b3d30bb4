//! Per-instance counter settings.
//!
//! The host owns the persisted settings blob and hands it back to us on every
//! event. Both fields are optional on the wire, and the configuration form
//! submits numbers as strings, so all defaulting and coercion is funneled
//! through a single accessor here instead of being scattered across handlers.

use serde_json::{json, Value};

pub(crate) const DEFAULT_COUNT: i64 = 0;
pub(crate) const DEFAULT_INCREMENT: i64 = 1;

/// Strongly-typed view of the settings blob for one action instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSettings {
    pub count: i64,
    pub increment: i64,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            increment: DEFAULT_INCREMENT,
        }
    }
}

impl CounterSettings {
    /// Load settings from the wire blob, defaulting missing or unparseable
    /// fields: `count` → 0, `increment` → 1. Accepts JSON numbers and numeric
    /// strings; fractional values truncate toward zero.
    pub fn from_value(value: &Value) -> Self {
        Self {
            count: coerce_i64(&value["count"]).unwrap_or(DEFAULT_COUNT),
            increment: coerce_i64(&value["increment"]).unwrap_or(DEFAULT_INCREMENT),
        }
    }

    /// Wire form for `setSettings`. Always writes both fields as numbers.
    pub fn to_value(self) -> Value {
        json!({ "count": self.count, "increment": self.increment })
    }
}

/// Best-effort integer coercion for settings and relay fields.
pub(crate) fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_defaults() {
        let s = CounterSettings::from_value(&json!({}));
        assert_eq!(s, CounterSettings { count: 0, increment: 1 });
    }

    #[test]
    fn missing_increment_defaults_to_one() {
        let s = CounterSettings::from_value(&json!({ "count": 7 }));
        assert_eq!(s.count, 7);
        assert_eq!(s.increment, 1);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let s = CounterSettings::from_value(&json!({ "count": "42", "increment": " 3 " }));
        assert_eq!(s, CounterSettings { count: 42, increment: 3 });
    }

    #[test]
    fn fractional_values_truncate() {
        let s = CounterSettings::from_value(&json!({ "count": 5.9, "increment": "2.7" }));
        assert_eq!(s, CounterSettings { count: 5, increment: 2 });
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let s = CounterSettings::from_value(&json!({ "count": "abc", "increment": [1, 2] }));
        assert_eq!(s, CounterSettings::default());
    }

    #[test]
    fn non_object_blob_defaults() {
        assert_eq!(CounterSettings::from_value(&Value::Null), CounterSettings::default());
    }

    #[test]
    fn to_value_writes_both_fields() {
        let v = CounterSettings { count: 5, increment: 2 }.to_value();
        assert_eq!(v, json!({ "count": 5, "increment": 2 }));
    }

    #[test]
    fn negative_values_survive() {
        let s = CounterSettings::from_value(&json!({ "count": -4, "increment": "-2" }));
        assert_eq!(s, CounterSettings { count: -4, increment: -2 });
    }
}
