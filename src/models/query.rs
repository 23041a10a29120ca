//! Query-related data models.

use serde::{Deserialize, Serialize};

/// One result row: column name to JSON value, in result-set column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for QueryParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for QueryParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for QueryParam {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Read a string cell, treating JSON null and missing columns as `None`.
pub fn row_str(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Read a non-negative integer cell. Counts may arrive as numbers or as
/// decimal strings depending on the driver.
pub fn row_u64(row: &Row, column: &str) -> Option<u64> {
    match row.get(column)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|v| v.max(0) as u64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_row_str() {
        let r = row(json!({"a": "x", "b": null, "c": 3}));
        assert_eq!(row_str(&r, "a"), Some("x".to_string()));
        assert_eq!(row_str(&r, "b"), None);
        assert_eq!(row_str(&r, "c"), Some("3".to_string()));
        assert_eq!(row_str(&r, "missing"), None);
    }

    #[test]
    fn test_row_u64() {
        let r = row(json!({"n": 42, "s": "17", "neg": -1, "bad": "x"}));
        assert_eq!(row_u64(&r, "n"), Some(42));
        assert_eq!(row_u64(&r, "s"), Some(17));
        assert_eq!(row_u64(&r, "neg"), Some(0));
        assert_eq!(row_u64(&r, "bad"), None);
    }

    #[test]
    fn test_query_param_from() {
        assert_eq!(QueryParam::from("public"), QueryParam::String("public".into()));
        assert_eq!(QueryParam::from(7_i64), QueryParam::Int(7));
    }
}
