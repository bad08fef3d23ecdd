//! Rule selection for an incoming event.
//!
//! A rule matches when it is enabled, declares the event's type, and its
//! condition holds against `{payload, sku}`. Output order is input order,
//! which is the order operators later see recommendations in.

use serde::Serialize;

use crate::condition::evaluate_condition;
use crate::path::EvalContext;
use crate::types::{Event, EventType, Rule, SkuSnapshot};

/// Why a rule did or did not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchOutcome {
    Matched,
    Disabled,
    EventTypeMismatch,
    ConditionFalse,
}

impl MatchOutcome {
    /// Short operator-facing explanation.
    pub fn describe(&self) -> &'static str {
        match self {
            MatchOutcome::Matched => "matched",
            MatchOutcome::Disabled => "rule is disabled",
            MatchOutcome::EventTypeMismatch => "rule listens for a different event type",
            MatchOutcome::ConditionFalse => "condition is false",
        }
    }
}

/// Per-rule record produced by [`explain_matches`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTrace {
    pub rule_id: String,
    pub rule_name: String,
    pub outcome: MatchOutcome,
}

fn classify(rule: &Rule, event_type: EventType, ctx: &EvalContext) -> MatchOutcome {
    if !rule.enabled {
        MatchOutcome::Disabled
    } else if rule.event_type != event_type {
        MatchOutcome::EventTypeMismatch
    } else if !evaluate_condition(&rule.condition, ctx) {
        MatchOutcome::ConditionFalse
    } else {
        MatchOutcome::Matched
    }
}

/// Select the rules that fire for `event`, preserving input order.
pub fn match_rules<'r>(event: &Event, sku: &SkuSnapshot, rules: &'r [Rule]) -> Vec<&'r Rule> {
    let ctx = EvalContext::new(event, sku);
    let event_type = event.event_type();
    rules
        .iter()
        .filter(|rule| classify(rule, event_type, &ctx) == MatchOutcome::Matched)
        .collect()
}

/// One trace per rule, in input order, explaining the match decision.
pub fn explain_matches(event: &Event, sku: &SkuSnapshot, rules: &[Rule]) -> Vec<MatchTrace> {
    let ctx = EvalContext::new(event, sku);
    let event_type = event.event_type();
    rules
        .iter()
        .map(|rule| MatchTrace {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            outcome: classify(rule, event_type, &ctx),
        })
        .collect()
}
