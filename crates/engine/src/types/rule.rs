//! Rules, condition trees and action templates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::event::EventType;
use super::value::Value;
use super::EngineError;

/// Dotted-path prefixes that make a string operand a context lookup.
pub const PATH_PREFIXES: [&str; 2] = ["payload.", "sku."];

/// A tenant-owned rule. Rules are independent of each other; their order in
/// a rule set is creation order and is preserved by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub event_type: EventType,
    pub enabled: bool,
    pub condition: ConditionNode,
    pub action_template: ActionTemplate,
}

impl Rule {
    /// Parse one rule from its stored JSON form.
    pub fn from_json(v: &serde_json::Value) -> Result<Rule, EngineError> {
        Ok(Rule::deserialize(v)?)
    }

    /// Check that the action template can be built from the rule's event type.
    ///
    /// Price templates read fields only one event variant carries; a rule
    /// pairing them with another event would fail every evaluation it matches.
    pub fn check_template(&self) -> Result<(), EngineError> {
        let action = self.action_template.action_type;
        match action.required_event() {
            Some(required) if required != self.event_type => Err(EngineError::TemplateMismatch {
                rule_id: self.id.clone(),
                action,
                event_type: self.event_type,
            }),
            _ => Ok(()),
        }
    }
}

// ──────────────────────────────────────────────
// Condition trees
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Neq,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Eq => "eq",
            CompareOp::Neq => "neq",
        }
    }

    fn parse(op: &str) -> Option<CompareOp> {
        match op {
            "lt" => Some(CompareOp::Lt),
            "lte" => Some(CompareOp::Lte),
            "gt" => Some(CompareOp::Gt),
            "gte" => Some(CompareOp::Gte),
            "eq" => Some(CompareOp::Eq),
            "neq" => Some(CompareOp::Neq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `payload.<field>...` or `sku.<field>...`, resolved against the context.
    Path(String),
    /// Any other scalar, used verbatim.
    Literal(Value),
    /// JSON `null`: compares equal only to a missing field.
    Absent,
}

impl Operand {
    fn from_json(v: &serde_json::Value) -> Result<Operand, EngineError> {
        match v {
            serde_json::Value::Null => Ok(Operand::Absent),
            serde_json::Value::String(s)
                if PATH_PREFIXES.iter().any(|prefix| s.starts_with(prefix)) =>
            {
                Ok(Operand::Path(s.clone()))
            }
            serde_json::Value::String(_)
            | serde_json::Value::Number(_)
            | serde_json::Value::Bool(_) => Value::from_json(v)
                .map(Operand::Literal)
                .ok_or_else(|| EngineError::InvalidCondition {
                    message: format!("operand {} is not representable", v),
                }),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(EngineError::InvalidCondition {
                    message: format!("operand must be a scalar or a dotted path, got {}", v),
                })
            }
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Operand::Path(p) => serde_json::Value::String(p.clone()),
            Operand::Literal(v) => v.to_json(),
            Operand::Absent => serde_json::Value::Null,
        }
    }
}

/// A boolean expression tree stored on a rule.
///
/// Serialized as `{"op": "lt", "left": .., "right": ..}` for comparisons and
/// `{"op": "and", "children": [..]}` for boolean nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum ConditionNode {
    Comparison {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    Boolean {
        op: BoolOp,
        children: Vec<ConditionNode>,
    },
}

impl ConditionNode {
    pub fn compare(op: CompareOp, left: Operand, right: Operand) -> Self {
        ConditionNode::Comparison { op, left, right }
    }

    pub fn all(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Boolean {
            op: BoolOp::And,
            children,
        }
    }

    pub fn any(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Boolean {
            op: BoolOp::Or,
            children,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConditionNode::Comparison { op, left, right } => serde_json::json!({
                "op": op.as_str(),
                "left": left.to_json(),
                "right": right.to_json(),
            }),
            ConditionNode::Boolean { op, children } => serde_json::json!({
                "op": op.as_str(),
                "children": children.iter().map(ConditionNode::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

impl TryFrom<serde_json::Value> for ConditionNode {
    type Error = EngineError;

    fn try_from(v: serde_json::Value) -> Result<Self, Self::Error> {
        parse_condition(&v)
    }
}

impl From<ConditionNode> for serde_json::Value {
    fn from(node: ConditionNode) -> Self {
        node.to_json()
    }
}

/// Parse a condition tree from its JSON form.
pub fn parse_condition(v: &serde_json::Value) -> Result<ConditionNode, EngineError> {
    let op = v
        .get("op")
        .and_then(|o| o.as_str())
        .ok_or_else(|| EngineError::InvalidCondition {
            message: format!("condition node missing string 'op': {}", v),
        })?;

    match op {
        "and" | "or" => {
            let children = v
                .get("children")
                .and_then(|c| c.as_array())
                .ok_or_else(|| EngineError::InvalidCondition {
                    message: format!("'{}' missing 'children' array", op),
                })?;
            if children.is_empty() {
                return Err(EngineError::InvalidCondition {
                    message: format!("'{}' requires at least one child", op),
                });
            }
            let children = children
                .iter()
                .map(parse_condition)
                .collect::<Result<Vec<_>, _>>()?;
            let op = if op == "and" { BoolOp::And } else { BoolOp::Or };
            Ok(ConditionNode::Boolean { op, children })
        }
        other => {
            let cmp = CompareOp::parse(other).ok_or_else(|| EngineError::InvalidCondition {
                message: format!("unknown operator '{}'", other),
            })?;
            let left = v.get("left").ok_or_else(|| EngineError::InvalidCondition {
                message: format!("'{}' missing 'left'", other),
            })?;
            let right = v.get("right").ok_or_else(|| EngineError::InvalidCondition {
                message: format!("'{}' missing 'right'", other),
            })?;
            Ok(ConditionNode::Comparison {
                op: cmp,
                left: Operand::from_json(left)?,
                right: Operand::from_json(right)?,
            })
        }
    }
}

// ──────────────────────────────────────────────
// Action templates
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    PriceMatch,
    PriceIncrease,
    Notify,
}

impl ActionType {
    /// The only event type this action can be built from, if restricted.
    pub fn required_event(&self) -> Option<EventType> {
        match self {
            ActionType::PriceMatch => Some(EventType::CompetitorPriceDrop),
            ActionType::PriceIncrease => Some(EventType::CostIncrease),
            ActionType::Notify => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::PriceMatch => "PRICE_MATCH",
            ActionType::PriceIncrease => "PRICE_INCREASE",
            ActionType::Notify => "NOTIFY",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl ActionTemplate {
    pub fn new(action_type: ActionType) -> Self {
        ActionTemplate {
            action_type,
            params: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn rule_from_json_reports_deserialize_errors() {
        let rule = Rule::from_json(&json!({
            "id": "r1",
            "name": "Match",
            "eventType": "COMPETITOR_PRICE_DROP",
            "enabled": true,
            "condition": { "op": "lt", "left": "payload.newPrice", "right": "sku.currentPrice" },
            "actionTemplate": { "type": "PRICE_MATCH" }
        }))
        .unwrap();
        assert_eq!(rule.action_template.action_type, ActionType::PriceMatch);

        let err = Rule::from_json(&json!({ "id": "r1" })).unwrap_err();
        assert!(matches!(err, EngineError::Deserialize { .. }));
    }

    #[test]
    fn check_template_rejects_price_action_on_foreign_event() {
        let mut rule = Rule::from_json(&json!({
            "id": "restock-match",
            "name": "Match on low stock",
            "eventType": "STOCK_LOW",
            "enabled": true,
            "condition": { "op": "eq", "left": 1, "right": 1 },
            "actionTemplate": { "type": "PRICE_MATCH" }
        }))
        .unwrap();
        let err = rule.check_template().unwrap_err();
        assert_eq!(
            err.to_string(),
            "rule 'restock-match': PRICE_MATCH action cannot be built from a STOCK_LOW event"
        );

        rule.action_template.action_type = ActionType::PriceIncrease;
        assert!(rule.check_template().is_err());
        rule.event_type = EventType::CostIncrease;
        assert!(rule.check_template().is_ok());

        rule.action_template.action_type = ActionType::Notify;
        for event_type in [
            EventType::CompetitorPriceDrop,
            EventType::CostIncrease,
            EventType::StockLow,
        ] {
            rule.event_type = event_type;
            assert!(rule.check_template().is_ok());
        }
    }

    #[test]
    fn parse_comparison_with_paths() {
        let node = parse_condition(&json!({
            "op": "lt",
            "left": "payload.newPrice",
            "right": "sku.currentPrice"
        }))
        .unwrap();
        assert_eq!(
            node,
            ConditionNode::compare(
                CompareOp::Lt,
                Operand::Path("payload.newPrice".to_string()),
                Operand::Path("sku.currentPrice".to_string()),
            )
        );
    }

    #[test]
    fn unprefixed_strings_are_literals() {
        let node = parse_condition(&json!({
            "op": "eq",
            "left": "payload.competitor",
            "right": "skus.MegaMart"
        }))
        .unwrap();
        match node {
            ConditionNode::Comparison { right, .. } => {
                assert_eq!(right, Operand::Literal(Value::from("skus.MegaMart")));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn parse_nested_boolean() {
        let node = parse_condition(&json!({
            "op": "or",
            "children": [
                { "op": "gte", "left": "payload.newCost", "right": 10.5 },
                { "op": "and", "children": [
                    { "op": "eq", "left": "payload.supplier", "right": "Acme" },
                    { "op": "neq", "left": "sku.id", "right": null }
                ]}
            ]
        }))
        .unwrap();
        match node {
            ConditionNode::Boolean { op, children } => {
                assert_eq!(op, BoolOp::Or);
                assert_eq!(children.len(), 2);
                match &children[0] {
                    ConditionNode::Comparison { right, .. } => {
                        assert_eq!(right, &Operand::Literal(Value::Number(Decimal::new(105, 1))));
                    }
                    other => panic!("expected comparison, got {:?}", other),
                }
            }
            other => panic!("expected boolean node, got {:?}", other),
        }
    }

    #[test]
    fn empty_children_rejected() {
        let err = parse_condition(&json!({ "op": "and", "children": [] })).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCondition { .. }));
    }

    #[test]
    fn unknown_operator_rejected() {
        let err = parse_condition(&json!({ "op": "like", "left": 1, "right": 2 })).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidCondition {
                message: "unknown operator 'like'".to_string()
            }
        );
    }

    #[test]
    fn object_operand_rejected() {
        let result = parse_condition(&json!({ "op": "eq", "left": { "x": 1 }, "right": 2 }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_right_rejected() {
        let result = parse_condition(&json!({ "op": "gt", "left": "payload.available" }));
        assert!(result.is_err());
    }

    #[test]
    fn condition_json_roundtrips_through_rule() {
        let rule_json = json!({
            "id": "r1",
            "name": "Match competitor",
            "eventType": "COMPETITOR_PRICE_DROP",
            "enabled": true,
            "condition": { "op": "lt", "left": "payload.newPrice", "right": "sku.currentPrice" },
            "actionTemplate": { "type": "PRICE_MATCH" }
        });
        let rule: Rule = serde_json::from_value(rule_json.clone()).unwrap();
        assert_eq!(rule.action_template.action_type, ActionType::PriceMatch);
        assert_eq!(serde_json::to_value(&rule).unwrap(), rule_json);
    }

    #[test]
    fn invalid_condition_fails_rule_deserialization() {
        let result: Result<Rule, _> = serde_json::from_value(json!({
            "id": "r1",
            "name": "broken",
            "eventType": "STOCK_LOW",
            "enabled": true,
            "condition": { "op": "or", "children": [] },
            "actionTemplate": { "type": "NOTIFY" }
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("at least one child"));
    }
}
