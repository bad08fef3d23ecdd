//! Guardrail enforcement for suggested prices.
//!
//! Reconciles three constraints on a raw suggested price:
//!
//! 1. the margin floor `cost / (1 - minMarginPct/100)`, which is never given up;
//! 2. the max-change band `currentPrice * (1 ± maxChangePct/100)`;
//! 3. the tenant rounding mode, which is cosmetic.
//!
//! The result is either an OK price or a BLOCKED verdict. BLOCKED is a value,
//! not an error: it means no price satisfies the hard constraints, or rounding
//! cannot be reconciled with them.
//!
//! The steps run in a fixed order and each one either continues with an
//! updated candidate or stops with a [`BlockReason`]. The order is
//! significant near boundaries; do not reorder.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::numeric::{margin_pct, pct_fraction, round2, snap_down, snap_nearest, snap_up};
use crate::types::{GuardrailPolicy, RoundingMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyStatus {
    Ok,
    Blocked,
}

/// Why no safe price exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    #[serde(rename = "invalid min margin requirement")]
    InvalidMinMargin,
    #[serde(rename = "cannot satisfy margin within max price change guardrail")]
    MarginOutsideBand,
    #[serde(rename = "cannot satisfy minimum margin after rounding and max-change guardrail")]
    MarginAfterRounding,
    #[serde(rename = "cannot satisfy max price change guardrail after rounding")]
    MaxChangeAfterRounding,
    #[serde(rename = "price is outside the supported numeric range")]
    OutOfRange,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::InvalidMinMargin => "invalid min margin requirement",
            BlockReason::MarginOutsideBand => {
                "cannot satisfy margin within max price change guardrail"
            }
            BlockReason::MarginAfterRounding => {
                "cannot satisfy minimum margin after rounding and max-change guardrail"
            }
            BlockReason::MaxChangeAfterRounding => {
                "cannot satisfy max price change guardrail after rounding"
            }
            BlockReason::OutOfRange => "price is outside the supported numeric range",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`enforce`].
///
/// For BLOCKED results `suggested_price_final` equals the original price and
/// `adjusted` is false; callers must not apply a BLOCKED price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailResult {
    pub safety_status: SafetyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_reason: Option<BlockReason>,
    pub suggested_price_original: Decimal,
    pub suggested_price_final: Decimal,
    pub adjusted: bool,
    /// Every adjustment applied, in the order it happened.
    pub reasons: Vec<String>,
    /// Margin at the final price (OK results only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_pct_final: Option<Decimal>,
}

impl GuardrailResult {
    pub fn is_ok(&self) -> bool {
        self.safety_status == SafetyStatus::Ok
    }

    pub fn is_blocked(&self) -> bool {
        self.safety_status == SafetyStatus::Blocked
    }
}

/// Prices within `maxChangePct` of the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxChangeBand {
    pub lower: Decimal,
    pub upper: Decimal,
}

impl MaxChangeBand {
    /// `Ok(None)` when `current_price <= 0`: there is nothing to anchor the
    /// band to, so no max-change constraint applies. Fails with
    /// [`BlockReason::OutOfRange`] when a bound is not representable.
    pub fn around(
        current_price: Decimal,
        max_change_pct: Decimal,
    ) -> Result<Option<Self>, BlockReason> {
        if current_price <= Decimal::ZERO {
            return Ok(None);
        }
        let fraction = pct_fraction(max_change_pct);
        let scale = |factor: Option<Decimal>| {
            factor
                .and_then(|f| current_price.checked_mul(f))
                .ok_or(BlockReason::OutOfRange)
        };
        Ok(Some(MaxChangeBand {
            lower: scale(Decimal::ONE.checked_sub(fraction))?,
            upper: scale(Decimal::ONE.checked_add(fraction))?,
        }))
    }

    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.lower && price <= self.upper
    }

    pub fn clamp(&self, price: Decimal) -> Decimal {
        price.max(self.lower).min(self.upper)
    }
}

/// Lowest price meeting the margin requirement. `None` when the requirement
/// can never be met (`min_margin_pct >= 100`).
pub fn min_price_for_margin(cost: Decimal, min_margin_pct: Decimal) -> Option<Decimal> {
    if min_margin_pct >= Decimal::ONE_HUNDRED {
        return None;
    }
    let denominator = Decimal::ONE - pct_fraction(min_margin_pct);
    if denominator <= Decimal::ZERO {
        return None;
    }
    cost.checked_div(denominator)
}

/// Candidate price plus the adjustment log, threaded through every step.
struct Enforcement {
    candidate: Decimal,
    reasons: Vec<String>,
}

type Step = Result<(), BlockReason>;

impl Enforcement {
    fn set(&mut self, price: Decimal, reason: impl FnOnce(Decimal, Decimal) -> String) {
        let line = reason(self.candidate, price);
        self.reasons.push(line);
        self.candidate = price;
    }

    fn clamp_to_band(&mut self, band: Option<&MaxChangeBand>, max_change_pct: Decimal) {
        let Some(band) = band else { return };
        let clamped = band.clamp(self.candidate);
        if clamped != self.candidate {
            self.set(clamped, |from, to| {
                format!(
                    "adjusted by max-change guardrail ({}%): {} -> {}",
                    max_change_pct,
                    round2(from),
                    round2(to)
                )
            });
        }
    }

    fn raise_to_margin(&mut self, floor: Decimal, min_margin_pct: Decimal) {
        if self.candidate < floor {
            self.set(floor, |from, to| {
                format!(
                    "raised to meet minimum margin ({}%): {} -> {}",
                    min_margin_pct,
                    round2(from),
                    round2(to)
                )
            });
        }
    }

    fn ensure_within_band(&self, band: Option<&MaxChangeBand>) -> Step {
        match band {
            Some(band) if self.candidate > band.upper => Err(BlockReason::MarginOutsideBand),
            _ => Ok(()),
        }
    }

    fn apply_rounding(&mut self, mode: RoundingMode) -> Step {
        let rounded = snap_nearest(self.candidate, mode).ok_or(BlockReason::OutOfRange)?;
        if rounded != self.candidate {
            self.set(rounded, |from, to| {
                format!(
                    "rounded by workspace setting ({}): {} -> {}",
                    mode,
                    round2(from),
                    round2(to)
                )
            });
        }
        Ok(())
    }

    /// Rounding went below the band: try the lowest valid multiple inside it.
    fn repair_lower_bound(&mut self, band: Option<&MaxChangeBand>, mode: RoundingMode) -> Step {
        let Some(band) = band else { return Ok(()) };
        if self.candidate >= band.lower {
            return Ok(());
        }
        let repaired = snap_up(band.lower, mode).ok_or(BlockReason::OutOfRange)?;
        if repaired <= band.upper {
            self.set(repaired, |from, to| {
                format!(
                    "raised to max-change lower bound after rounding: {} -> {}",
                    round2(from),
                    round2(to)
                )
            });
        }
        Ok(())
    }

    fn repair_margin(
        &mut self,
        floor: Decimal,
        band: Option<&MaxChangeBand>,
        mode: RoundingMode,
    ) -> Step {
        if self.candidate >= floor {
            return Ok(());
        }
        let repaired = snap_up(floor, mode).ok_or(BlockReason::OutOfRange)?;
        if band.is_some_and(|band| repaired > band.upper) {
            return Err(BlockReason::MarginAfterRounding);
        }
        self.set(repaired, |from, to| {
            format!(
                "raised to meet minimum margin after rounding: {} -> {}",
                round2(from),
                round2(to)
            )
        });
        Ok(())
    }

    fn repair_upper_bound(
        &mut self,
        band: Option<&MaxChangeBand>,
        cost: Decimal,
        floor: Decimal,
        mode: RoundingMode,
    ) -> Step {
        let Some(band) = band else { return Ok(()) };
        if self.candidate <= band.upper {
            return Ok(());
        }
        let repaired = snap_down(band.upper, mode).ok_or(BlockReason::OutOfRange)?;
        if repaired < cost || repaired < floor {
            return Err(BlockReason::MaxChangeAfterRounding);
        }
        self.set(repaired, |from, to| {
            format!(
                "lowered to max-change upper bound after rounding: {} -> {}",
                round2(from),
                round2(to)
            )
        });
        Ok(())
    }
}

fn run_steps(
    state: &mut Enforcement,
    cost: Decimal,
    current_price: Decimal,
    policy: &GuardrailPolicy,
) -> Step {
    let band = MaxChangeBand::around(current_price, policy.max_change_pct)?;
    let band = band.as_ref();
    let mode = policy.rounding_mode;

    state.clamp_to_band(band, policy.max_change_pct);

    let floor = min_price_for_margin(cost, policy.min_margin_pct)
        .ok_or(BlockReason::InvalidMinMargin)?;
    state.raise_to_margin(floor, policy.min_margin_pct);
    state.ensure_within_band(band)?;

    state.apply_rounding(mode)?;

    state.repair_lower_bound(band, mode)?;
    state.repair_margin(floor, band, mode)?;
    state.repair_upper_bound(band, cost, floor, mode)?;
    Ok(())
}

/// Run a suggested price through the tenant's guardrails.
///
/// Pure and deterministic: the same inputs always produce the same result,
/// so hosts re-run it at execution time against fresh SKU numbers instead of
/// trusting an earlier result. It is also the entry point for validating a
/// manually entered price.
pub fn enforce(
    cost: Decimal,
    current_price: Decimal,
    suggested_price: Decimal,
    policy: &GuardrailPolicy,
) -> GuardrailResult {
    let original = round2(suggested_price);
    let mut state = Enforcement {
        candidate: original,
        reasons: Vec::new(),
    };

    match run_steps(&mut state, cost, current_price, policy) {
        Ok(()) => {
            let final_price = round2(state.candidate);
            GuardrailResult {
                safety_status: SafetyStatus::Ok,
                safety_reason: None,
                suggested_price_original: original,
                suggested_price_final: final_price,
                adjusted: final_price != original,
                reasons: state.reasons,
                margin_pct_final: margin_pct(final_price, cost),
            }
        }
        Err(reason) => GuardrailResult {
            safety_status: SafetyStatus::Blocked,
            safety_reason: Some(reason),
            suggested_price_original: original,
            suggested_price_final: original,
            adjusted: false,
            reasons: state.reasons,
            margin_pct_final: None,
        },
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
