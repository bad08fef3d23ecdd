//! Business events and the SKU snapshot they are evaluated against.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::value::Value;

/// Discriminant of [`Event`], used by rules to declare what they react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    CompetitorPriceDrop,
    CostIncrease,
    StockLow,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CompetitorPriceDrop => "COMPETITOR_PRICE_DROP",
            EventType::CostIncrease => "COST_INCREASE",
            EventType::StockLow => "STOCK_LOW",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competitor listed the SKU below our price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompetitorPriceDrop {
    pub new_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor: Option<String>,
}

/// The unit cost of the SKU went up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CostIncrease {
    pub old_cost: Decimal,
    pub new_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

/// Available stock fell to or below the configured threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StockLow {
    pub available: i64,
    pub threshold: i64,
}

/// A business event targeting one SKU.
///
/// Wire format: `{"type": "COST_INCREASE", "skuId": "...", "payload": {...}}`.
/// Payload validation happens during deserialization; the engine only ever
/// sees well-typed payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    CompetitorPriceDrop {
        #[serde(rename = "skuId")]
        sku_id: String,
        payload: CompetitorPriceDrop,
    },
    CostIncrease {
        #[serde(rename = "skuId")]
        sku_id: String,
        payload: CostIncrease,
    },
    StockLow {
        #[serde(rename = "skuId")]
        sku_id: String,
        payload: StockLow,
    },
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::CompetitorPriceDrop { .. } => EventType::CompetitorPriceDrop,
            Event::CostIncrease { .. } => EventType::CostIncrease,
            Event::StockLow { .. } => EventType::StockLow,
        }
    }

    pub fn sku_id(&self) -> &str {
        match self {
            Event::CompetitorPriceDrop { sku_id, .. }
            | Event::CostIncrease { sku_id, .. }
            | Event::StockLow { sku_id, .. } => sku_id,
        }
    }

    /// The payload as a dynamic record, keyed the way rule paths address it
    /// (`payload.newPrice`, `payload.oldCost`, ...).
    pub fn payload_record(&self) -> BTreeMap<String, Value> {
        let mut fields = BTreeMap::new();
        match self {
            Event::CompetitorPriceDrop { payload, .. } => {
                fields.insert("newPrice".to_string(), Value::Number(payload.new_price));
                if let Some(old) = payload.old_price {
                    fields.insert("oldPrice".to_string(), Value::Number(old));
                }
                if let Some(name) = &payload.competitor {
                    fields.insert("competitor".to_string(), Value::Text(name.clone()));
                }
            }
            Event::CostIncrease { payload, .. } => {
                fields.insert("oldCost".to_string(), Value::Number(payload.old_cost));
                fields.insert("newCost".to_string(), Value::Number(payload.new_cost));
                if let Some(name) = &payload.supplier {
                    fields.insert("supplier".to_string(), Value::Text(name.clone()));
                }
            }
            Event::StockLow { payload, .. } => {
                fields.insert("available".to_string(), Value::from(payload.available));
                fields.insert("threshold".to_string(), Value::from(payload.threshold));
            }
        }
        fields
    }
}

/// Read-only view of the SKU at evaluation time.
///
/// `cost` and `current_price` are expected to be positive; the guardrail
/// treats a non-positive current price as "no max-change band".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub cost: Decimal,
    pub current_price: Decimal,
    /// Free-form catalog attributes, addressable as `sku.attributes.<key>`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl SkuSnapshot {
    pub fn new(cost: Decimal, current_price: Decimal) -> Self {
        SkuSnapshot {
            id: None,
            cost,
            current_price,
            attributes: BTreeMap::new(),
        }
    }

    pub fn record(&self) -> BTreeMap<String, Value> {
        let mut fields = BTreeMap::new();
        if let Some(id) = &self.id {
            fields.insert("id".to_string(), Value::Text(id.clone()));
        }
        fields.insert("cost".to_string(), Value::Number(self.cost));
        fields.insert("currentPrice".to_string(), Value::Number(self.current_price));
        if !self.attributes.is_empty() {
            let attrs = self
                .attributes
                .iter()
                .filter_map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
                .collect();
            fields.insert("attributes".to_string(), Value::Record(attrs));
        }
        fields
    }
}
