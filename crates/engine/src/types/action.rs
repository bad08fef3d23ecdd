//! Engine output: suggested actions and their guardrail verdicts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rule::ActionType;
use crate::guardrail::GuardrailResult;

/// Price-changing action details. `suggested_price` is the raw price before
/// guardrails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDetails {
    pub sku_id: String,
    pub current_price: Decimal,
    pub suggested_price: Decimal,
    pub delta: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyDetails {
    pub sku_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionDetails {
    Price(PriceDetails),
    Notify(NotifyDetails),
}

/// A candidate action produced for one matched rule. Not yet applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub title: String,
    pub details: ActionDetails,
    pub rule_id: String,
    /// Name of the rule that produced the action.
    pub reason: String,
}

impl SuggestedAction {
    /// Raw suggested price for price-changing actions.
    pub fn suggested_price(&self) -> Option<Decimal> {
        match &self.details {
            ActionDetails::Price(p) => Some(p.suggested_price),
            ActionDetails::Notify(_) => None,
        }
    }
}

/// One matched rule's output: the action, plus the guardrail verdict when the
/// action changes the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: SuggestedAction,
    pub guardrail: Option<GuardrailResult>,
}

impl Recommendation {
    pub fn is_blocked(&self) -> bool {
        self.guardrail.as_ref().is_some_and(GuardrailResult::is_blocked)
    }
}
