//! Money arithmetic on `rust_decimal`.
//!
//! Every price and percentage in the engine is a `Decimal`; there is no `f64`
//! in any evaluation path. Prices are rounded to cents with
//! `RoundingStrategy::MidpointAwayFromZero`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::types::RoundingMode;

/// Round to 2 decimal places, halves away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `pct` percent as a fraction (`15` -> `0.15`).
pub fn pct_fraction(pct: Decimal) -> Decimal {
    pct / Decimal::ONE_HUNDRED
}

// The snap helpers return `None` when the snapped multiple is not
// representable (e.g. rounding `Decimal::MAX` up to a multiple of 10).
fn snap(value: Decimal, mode: RoundingMode, strategy: RoundingStrategy) -> Option<Decimal> {
    match mode.step() {
        None => Some(value),
        Some(step) => value
            .checked_div(step)?
            .round_dp_with_strategy(0, strategy)
            .checked_mul(step),
    }
}

/// Snap to the nearest multiple of the mode's step. Identity for `NONE`.
pub fn snap_nearest(value: Decimal, mode: RoundingMode) -> Option<Decimal> {
    snap(value, mode, RoundingStrategy::MidpointAwayFromZero)
}

/// Smallest multiple of the mode's step that is `>= value`. Identity for `NONE`.
pub fn snap_up(value: Decimal, mode: RoundingMode) -> Option<Decimal> {
    snap(value, mode, RoundingStrategy::ToPositiveInfinity)
}

/// Largest multiple of the mode's step that is `<= value`. Identity for `NONE`.
pub fn snap_down(value: Decimal, mode: RoundingMode) -> Option<Decimal> {
    snap(value, mode, RoundingStrategy::ToNegativeInfinity)
}

/// Margin at `price`, in percent, rounded to cents. `None` for non-positive
/// prices and when the margin is not representable.
pub fn margin_pct(price: Decimal, cost: Decimal) -> Option<Decimal> {
    if price <= Decimal::ZERO {
        return None;
    }
    let margin = price
        .checked_sub(cost)?
        .checked_div(price)?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    Some(round2(margin))
}

/// Convert a JSON number through its textual form so `19.99` stays `19.99`.
pub fn decimal_from_json(n: &serde_json::Number) -> Option<Decimal> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Emit a JSON number when the decimal survives the trip through `f64`,
/// otherwise its exact string form.
pub fn decimal_to_json(d: Decimal) -> serde_json::Value {
    if let Some(i) = d.to_i64().filter(|i| Decimal::from(*i) == d) {
        return serde_json::Value::from(i);
    }
    d.to_f64()
        .filter(|f| Decimal::from_str(&f.to_string()).ok() == Some(d.normalize()))
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(d.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn round2_halves_away_from_zero() {
        assert_eq!(round2(d("1.005")), d("1.01"));
        assert_eq!(round2(d("1.004")), d("1.00"));
        assert_eq!(round2(d("166.666666")), d("166.67"));
    }

    #[test]
    fn snap_nearest_by_mode() {
        assert_eq!(snap_nearest(d("94.50"), RoundingMode::Nearest1), Some(d("95")));
        assert_eq!(snap_nearest(d("94.49"), RoundingMode::Nearest1), Some(d("94")));
        assert_eq!(snap_nearest(d("92.50"), RoundingMode::Nearest5), Some(d("95")));
        assert_eq!(snap_nearest(d("92.49"), RoundingMode::Nearest5), Some(d("90")));
        assert_eq!(snap_nearest(d("105"), RoundingMode::Nearest10), Some(d("110")));
        assert_eq!(snap_nearest(d("94.437"), RoundingMode::None), Some(d("94.437")));
    }

    #[test]
    fn snap_up_and_down() {
        assert_eq!(snap_up(d("85.01"), RoundingMode::Nearest5), Some(d("90")));
        assert_eq!(snap_up(d("85"), RoundingMode::Nearest5), Some(d("85")));
        assert_eq!(snap_down(d("114.99"), RoundingMode::Nearest10), Some(d("110")));
        assert_eq!(snap_down(d("120"), RoundingMode::Nearest10), Some(d("120")));
        assert_eq!(snap_up(d("3.333"), RoundingMode::None), Some(d("3.333")));
        assert_eq!(snap_down(d("3.333"), RoundingMode::None), Some(d("3.333")));
    }

    #[test]
    fn snap_past_the_decimal_range_is_none() {
        assert_eq!(snap_nearest(Decimal::MAX, RoundingMode::Nearest10), None);
        assert_eq!(snap_up(Decimal::MAX, RoundingMode::Nearest10), None);
        assert_eq!(snap_down(Decimal::MAX, RoundingMode::Nearest10), Some(d("79228162514264337593543950330")));
        assert_eq!(snap_nearest(Decimal::MAX, RoundingMode::None), Some(Decimal::MAX));
    }

    #[test]
    fn margin_pct_at_price() {
        assert_eq!(margin_pct(d("95"), d("80")), Some(d("15.79")));
        assert_eq!(margin_pct(d("100"), d("100")), Some(d("0")));
        assert_eq!(margin_pct(d("0"), d("10")), None);
        assert_eq!(margin_pct(Decimal::MAX, Decimal::MIN), None);
    }

    #[test]
    fn json_number_conversion() {
        let n = serde_json::Number::from_f64(0.1).unwrap();
        assert_eq!(decimal_from_json(&n), Some(d("0.1")));
        let n = serde_json::Number::from(42u64);
        assert_eq!(decimal_from_json(&n), Some(d("42")));
    }

    #[test]
    fn decimal_to_json_prefers_numbers() {
        assert_eq!(decimal_to_json(d("42")), serde_json::json!(42));
        assert_eq!(decimal_to_json(d("10.5")), serde_json::json!(10.5));
    }
}
