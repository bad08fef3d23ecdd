//! Turns matched rules into suggested actions with raw prices.
//!
//! Raw prices are not safe to apply; price-changing actions still go through
//! [`crate::guardrail::enforce`].

use crate::numeric::round2;
use crate::types::{
    ActionDetails, ActionType, EngineError, Event, NotifyDetails, PriceDetails, Rule, SkuSnapshot,
    SuggestedAction,
};

/// Build the suggested action for one matched rule.
///
/// Fails with `TemplateMismatch` when a price template needs a payload field
/// the event variant does not carry (e.g. PRICE_MATCH on a STOCK_LOW event).
pub fn synthesize_action(
    rule: &Rule,
    event: &Event,
    sku: &SkuSnapshot,
) -> Result<SuggestedAction, EngineError> {
    let action_type = rule.action_template.action_type;
    let sku_id = event.sku_id().to_string();
    let overflow = || EngineError::ArithmeticOverflow {
        rule_id: rule.id.clone(),
    };

    let (title, details) = match (action_type, event) {
        (ActionType::PriceMatch, Event::CompetitorPriceDrop { payload, .. }) => {
            // Never match upward.
            let suggested = round2(payload.new_price.min(sku.current_price));
            (
                "Match competitor price",
                ActionDetails::Price(PriceDetails {
                    sku_id,
                    current_price: sku.current_price,
                    suggested_price: suggested,
                    delta: suggested
                        .checked_sub(sku.current_price)
                        .ok_or_else(overflow)?,
                }),
            )
        }
        (ActionType::PriceIncrease, Event::CostIncrease { payload, .. }) => {
            // The absolute cost delta passes through 1:1.
            let delta = round2(
                payload
                    .new_cost
                    .checked_sub(payload.old_cost)
                    .ok_or_else(overflow)?,
            );
            let suggested = sku.current_price.checked_add(delta).ok_or_else(overflow)?;
            (
                "Raise price to cover cost increase",
                ActionDetails::Price(PriceDetails {
                    sku_id,
                    current_price: sku.current_price,
                    suggested_price: round2(suggested),
                    delta,
                }),
            )
        }
        (ActionType::Notify, _) => {
            let (title, available, threshold) = match event {
                Event::StockLow { payload, .. } => (
                    "Low stock alert",
                    Some(payload.available),
                    Some(payload.threshold),
                ),
                _ => ("Notification", None, None),
            };
            let message = rule
                .action_template
                .params
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string);
            (
                title,
                ActionDetails::Notify(NotifyDetails {
                    sku_id,
                    available,
                    threshold,
                    message,
                }),
            )
        }
        (action, event) => {
            return Err(EngineError::TemplateMismatch {
                rule_id: rule.id.clone(),
                action,
                event_type: event.event_type(),
            });
        }
    };

    Ok(SuggestedAction {
        action_type,
        title: title.to_string(),
        details,
        rule_id: rule.id.clone(),
        reason: rule.name.clone(),
    })
}

/// Synthesize actions for every matched rule, keeping rule order.
pub fn synthesize_actions(
    rules: &[&Rule],
    event: &Event,
    sku: &SkuSnapshot,
) -> Result<Vec<SuggestedAction>, EngineError> {
    rules
        .iter()
        .map(|rule| synthesize_action(rule, event, sku))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionTemplate, CompareOp, ConditionNode, EventType, Operand, Value};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rule(action_type: ActionType, event_type: EventType) -> Rule {
        Rule {
            id: "r1".to_string(),
            name: "Keep up with the market".to_string(),
            event_type,
            enabled: true,
            condition: ConditionNode::compare(
                CompareOp::Eq,
                Operand::Literal(Value::from(true)),
                Operand::Literal(Value::from(true)),
            ),
            action_template: ActionTemplate::new(action_type),
        }
    }

    fn event(v: serde_json::Value) -> Event {
        serde_json::from_value(v).unwrap()
    }

    fn sku(cost: &str, current: &str) -> SkuSnapshot {
        SkuSnapshot::new(d(cost), d(current))
    }

    #[test]
    fn price_match_follows_competitor_down() {
        let ev = event(json!({
            "type": "COMPETITOR_PRICE_DROP", "skuId": "s1", "payload": { "newPrice": "94.999" }
        }));
        let action = synthesize_action(
            &rule(ActionType::PriceMatch, EventType::CompetitorPriceDrop),
            &ev,
            &sku("80", "100"),
        )
        .unwrap();
        assert_eq!(action.action_type, ActionType::PriceMatch);
        assert_eq!(action.title, "Match competitor price");
        assert_eq!(action.suggested_price(), Some(d("95.00")));
        assert_eq!(action.reason, "Keep up with the market");
        assert_eq!(action.rule_id, "r1");
        match action.details {
            ActionDetails::Price(p) => {
                assert_eq!(p.delta, d("-5"));
                assert_eq!(p.sku_id, "s1");
            }
            other => panic!("expected price details, got {:?}", other),
        }
    }

    #[test]
    fn price_match_never_goes_up() {
        let ev = event(json!({
            "type": "COMPETITOR_PRICE_DROP", "skuId": "s1", "payload": { "newPrice": 120 }
        }));
        let action = synthesize_action(
            &rule(ActionType::PriceMatch, EventType::CompetitorPriceDrop),
            &ev,
            &sku("80", "100"),
        )
        .unwrap();
        assert_eq!(action.suggested_price(), Some(d("100")));
    }

    #[test]
    fn price_increase_passes_cost_delta_through() {
        let ev = event(json!({
            "type": "COST_INCREASE", "skuId": "s1",
            "payload": { "oldCost": "40.00", "newCost": "43.333" }
        }));
        let action = synthesize_action(
            &rule(ActionType::PriceIncrease, EventType::CostIncrease),
            &ev,
            &sku("43.333", "59.99"),
        )
        .unwrap();
        assert_eq!(action.suggested_price(), Some(d("63.32")));
        match action.details {
            ActionDetails::Price(p) => assert_eq!(p.delta, d("3.33")),
            other => panic!("expected price details, got {:?}", other),
        }
    }

    #[test]
    fn notify_on_stock_low_carries_levels() {
        let ev = event(json!({
            "type": "STOCK_LOW", "skuId": "s1", "payload": { "available": 3, "threshold": 10 }
        }));
        let mut r = rule(ActionType::Notify, EventType::StockLow);
        r.action_template
            .params
            .insert("message".to_string(), json!("Reorder from Acme"));
        let action = synthesize_action(&r, &ev, &sku("5", "9")).unwrap();
        assert_eq!(action.title, "Low stock alert");
        assert_eq!(action.suggested_price(), None);
        assert_eq!(
            action.details,
            ActionDetails::Notify(NotifyDetails {
                sku_id: "s1".to_string(),
                available: Some(3),
                threshold: Some(10),
                message: Some("Reorder from Acme".to_string()),
            })
        );
    }

    #[test]
    fn notify_on_other_events() {
        let ev = event(json!({
            "type": "COST_INCREASE", "skuId": "s1", "payload": { "oldCost": 1, "newCost": 2 }
        }));
        let action =
            synthesize_action(&rule(ActionType::Notify, EventType::CostIncrease), &ev, &sku("2", "3"))
                .unwrap();
        assert_eq!(action.title, "Notification");
        match action.details {
            ActionDetails::Notify(n) => {
                assert_eq!(n.available, None);
                assert_eq!(n.message, None);
            }
            other => panic!("expected notify details, got {:?}", other),
        }
    }

    #[test]
    fn cost_delta_past_the_decimal_range_is_an_error() {
        let ev = event(json!({
            "type": "COST_INCREASE",
            "skuId": "s1",
            "payload": { "oldCost": "1", "newCost": "79228162514264337593543950335" }
        }));
        let r = rule(ActionType::PriceIncrease, EventType::CostIncrease);
        let err = synthesize_action(&r, &ev, &sku("1", "10")).unwrap_err();
        assert_eq!(
            err,
            EngineError::ArithmeticOverflow {
                rule_id: "r1".to_string()
            }
        );
        assert_eq!(err.to_string(), "rule 'r1': price arithmetic overflowed");

        let ev = event(json!({
            "type": "COST_INCREASE",
            "skuId": "s1",
            "payload": { "oldCost": "-79228162514264337593543950335", "newCost": "1" }
        }));
        assert!(synthesize_action(&r, &ev, &sku("1", "10")).is_err());
    }

    #[test]
    fn price_template_on_wrong_event_is_an_error() {
        let ev = event(json!({
            "type": "STOCK_LOW", "skuId": "s1", "payload": { "available": 0, "threshold": 5 }
        }));
        let err = synthesize_action(&rule(ActionType::PriceMatch, EventType::StockLow), &ev, &sku("1", "2"))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::TemplateMismatch {
                rule_id: "r1".to_string(),
                action: ActionType::PriceMatch,
                event_type: EventType::StockLow,
            }
        );
        assert_eq!(
            err.to_string(),
            "rule 'r1': PRICE_MATCH action cannot be built from a STOCK_LOW event"
        );
    }
}
