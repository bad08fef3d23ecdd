//! Dynamic values addressed by condition operands.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::numeric;

/// A loosely-typed value inside the evaluation context.
///
/// Numbers are always `Decimal`. A missing field is represented by the
/// absence of a value (`Option::None`), never by a variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number(Decimal),
    Text(String),
    Bool(bool),
    Record(BTreeMap<String, Value>),
    /// Positions are kept: a JSON `null` element is an absent slot, so
    /// later indices still address the same elements.
    List(Vec<Option<Value>>),
}

impl Value {
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(d) => Some(*d),
            _ => None,
        }
    }

    /// Convert a JSON value. `null` and numbers that do not fit a `Decimal`
    /// have no representation and yield `None`.
    pub fn from_json(v: &serde_json::Value) -> Option<Value> {
        match v {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => numeric::decimal_from_json(n).map(Value::Number),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(items) => {
                Some(Value::List(items.iter().map(Value::from_json).collect()))
            }
            serde_json::Value::Object(map) => Some(Value::Record(
                map.iter()
                    .filter_map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }

    /// Serialize to plain JSON. Numbers are emitted as JSON numbers when they
    /// round-trip exactly, otherwise as strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(d) => numeric::decimal_to_json(*d),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Record(fields) => serde_json::Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.as_ref().map_or(serde_json::Value::Null, Value::to_json))
                    .collect(),
            ),
        }
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Number(d)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Decimal::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_become_decimals() {
        let v = Value::from_json(&json!(19.99)).unwrap();
        assert_eq!(v, Value::Number(Decimal::new(1999, 2)));
        let v = Value::from_json(&json!(3)).unwrap();
        assert_eq!(v, Value::Number(Decimal::from(3)));
    }

    #[test]
    fn null_is_absent() {
        assert_eq!(Value::from_json(&json!(null)), None);
    }

    #[test]
    fn null_fields_are_dropped_from_records() {
        let v = Value::from_json(&json!({ "brand": "acme", "line": null })).unwrap();
        match v {
            Value::Record(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields.get("brand"), Some(&Value::from("acme")));
            }
            other => panic!("expected Record, got {:?}", other),
        }
    }

    #[test]
    fn null_list_elements_keep_their_slot() {
        let v = Value::from_json(&json!([null, "clearance"])).unwrap();
        assert_eq!(v, Value::List(vec![None, Some(Value::from("clearance"))]));
        assert_eq!(v.to_json(), json!([null, "clearance"]));
    }

    #[test]
    fn decimal_equality_ignores_scale() {
        assert_eq!(
            Value::Number(Decimal::new(9500, 2)),
            Value::Number(Decimal::from(95))
        );
    }
}
