//! Data model for the pricing engine.
//!
//! Inputs (events, SKU snapshots, rules, policies) are deserialized from the
//! host's JSON; outputs (suggested actions, guardrail results) serialize back
//! to camelCase JSON. All money and percentages are `rust_decimal::Decimal`.

pub mod action;
pub mod event;
pub mod policy;
pub mod rule;
pub mod value;

pub use action::{ActionDetails, NotifyDetails, PriceDetails, Recommendation, SuggestedAction};
pub use event::{CompetitorPriceDrop, CostIncrease, Event, EventType, SkuSnapshot, StockLow};
pub use policy::{GuardrailPolicy, RoundingMode};
pub use rule::{
    parse_condition, ActionTemplate, ActionType, BoolOp, CompareOp, ConditionNode, Operand, Rule,
};
pub use value::Value;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors raised while building or running the pipeline.
///
/// Condition evaluation and guardrail enforcement never fail: type mismatches
/// evaluate to `false` and "no safe price" is a `SafetyStatus::Blocked`
/// result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A condition tree is structurally invalid.
    #[error("invalid condition: {message}")]
    InvalidCondition { message: String },

    /// An action template needs a payload field the event does not carry.
    #[error("rule '{rule_id}': {action} action cannot be built from a {event_type} event")]
    TemplateMismatch {
        rule_id: String,
        action: ActionType,
        event_type: EventType,
    },

    /// A price computed from event and SKU numbers left the decimal range.
    #[error("rule '{rule_id}': price arithmetic overflowed")]
    ArithmeticOverflow { rule_id: String },

    /// Malformed JSON input outside of condition trees.
    #[error("deserialization error: {message}")]
    Deserialize { message: String },
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Deserialize {
            message: e.to_string(),
        }
    }
}
