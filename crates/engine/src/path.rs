//! Dotted-path lookup against the `{payload, sku}` evaluation context.
//!
//! `payload.newPrice` walks the event payload, `sku.attributes.brand` walks
//! the SKU snapshot. A missing segment anywhere along the way resolves to
//! absent (`None`); resolution never fails.

use std::collections::BTreeMap;

use crate::types::rule::PATH_PREFIXES;
use crate::types::{Event, Operand, SkuSnapshot, Value};

/// The two roots a rule condition can address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalContext {
    pub payload: BTreeMap<String, Value>,
    pub sku: BTreeMap<String, Value>,
}

impl EvalContext {
    pub fn new(event: &Event, sku: &SkuSnapshot) -> Self {
        EvalContext {
            payload: event.payload_record(),
            sku: sku.record(),
        }
    }

    /// Resolve a dotted path. Strings without a `payload.` or `sku.` prefix
    /// are not paths and resolve to `None` here; see [`resolve_operand`].
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let [payload_prefix, sku_prefix] = PATH_PREFIXES;
        let (root, rest) = if let Some(rest) = path.strip_prefix(payload_prefix) {
            (&self.payload, rest)
        } else if let Some(rest) = path.strip_prefix(sku_prefix) {
            (&self.sku, rest)
        } else {
            return None;
        };

        let mut segments = rest.split('.');
        let mut current = root.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Record(fields) => fields.get(segment)?,
                Value::List(items) => items.get(segment.parse::<usize>().ok()?)?.as_ref()?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Resolve a comparison operand: paths are looked up, literals are returned
/// verbatim, `null` is absent.
pub fn resolve_operand<'a>(operand: &'a Operand, ctx: &'a EvalContext) -> Option<&'a Value> {
    match operand {
        Operand::Path(path) => ctx.lookup(path),
        Operand::Literal(value) => Some(value),
        Operand::Absent => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn context() -> EvalContext {
        let event: Event = serde_json::from_value(json!({
            "type": "COMPETITOR_PRICE_DROP",
            "skuId": "sku-1",
            "payload": { "newPrice": "95.00", "competitor": "MegaMart" }
        }))
        .unwrap();
        let sku: SkuSnapshot = serde_json::from_value(json!({
            "id": "sku-1",
            "cost": 80,
            "currentPrice": 100,
            "attributes": { "brand": { "name": "Acme" }, "tags": ["audio", "sale"] }
        }))
        .unwrap();
        EvalContext::new(&event, &sku)
    }

    #[test]
    fn resolves_payload_and_sku_fields() {
        let ctx = context();
        assert_eq!(
            ctx.lookup("payload.newPrice"),
            Some(&Value::Number(Decimal::new(9500, 2)))
        );
        assert_eq!(ctx.lookup("sku.currentPrice"), Some(&Value::from(100)));
    }

    #[test]
    fn resolves_nested_attributes_and_list_indices() {
        let ctx = context();
        assert_eq!(
            ctx.lookup("sku.attributes.brand.name"),
            Some(&Value::from("Acme"))
        );
        assert_eq!(ctx.lookup("sku.attributes.tags.1"), Some(&Value::from("sale")));
        assert_eq!(ctx.lookup("sku.attributes.tags.7"), None);
        assert_eq!(ctx.lookup("sku.attributes.tags.first"), None);
    }

    #[test]
    fn null_list_slots_do_not_shift_later_indices() {
        let event: Event = serde_json::from_value(json!({
            "type": "STOCK_LOW",
            "skuId": "sku-1",
            "payload": { "available": 1, "threshold": 5 }
        }))
        .unwrap();
        let sku: SkuSnapshot = serde_json::from_value(json!({
            "cost": 1,
            "currentPrice": 2,
            "attributes": { "tags": [null, "clearance"] }
        }))
        .unwrap();
        let ctx = EvalContext::new(&event, &sku);
        assert_eq!(ctx.lookup("sku.attributes.tags.0"), None);
        assert_eq!(ctx.lookup("sku.attributes.tags.1"), Some(&Value::from("clearance")));
        assert_eq!(ctx.lookup("sku.attributes.tags.0.name"), None);
    }

    #[test]
    fn missing_segments_are_absent() {
        let ctx = context();
        assert_eq!(ctx.lookup("payload.oldPrice"), None);
        assert_eq!(ctx.lookup("payload.newPrice.amount"), None);
        assert_eq!(ctx.lookup("sku.attributes.color.hex"), None);
        assert_eq!(ctx.lookup("payload."), None);
    }

    #[test]
    fn unprefixed_strings_are_not_paths() {
        let ctx = context();
        assert_eq!(ctx.lookup("newPrice"), None);
        assert_eq!(ctx.lookup("payload"), None);
    }

    #[test]
    fn literal_operands_resolve_verbatim() {
        let ctx = context();
        let literal = Operand::Literal(Value::from("payload"));
        assert_eq!(resolve_operand(&literal, &ctx), Some(&Value::from("payload")));
        assert_eq!(resolve_operand(&Operand::Absent, &ctx), None);
    }
}
