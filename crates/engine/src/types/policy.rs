//! Tenant guardrail policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the final price is snapped after the hard constraints are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    #[serde(rename = "NONE")]
    None,
    #[default]
    #[serde(rename = "NEAREST_1")]
    Nearest1,
    #[serde(rename = "NEAREST_5")]
    Nearest5,
    #[serde(rename = "NEAREST_10")]
    Nearest10,
}

impl RoundingMode {
    pub const ALL: [RoundingMode; 4] = [
        RoundingMode::None,
        RoundingMode::Nearest1,
        RoundingMode::Nearest5,
        RoundingMode::Nearest10,
    ];

    /// The multiple prices snap to, or `None` when rounding is disabled.
    pub fn step(&self) -> Option<Decimal> {
        match self {
            RoundingMode::None => None,
            RoundingMode::Nearest1 => Some(Decimal::ONE),
            RoundingMode::Nearest5 => Some(Decimal::from(5)),
            RoundingMode::Nearest10 => Some(Decimal::TEN),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingMode::None => "NONE",
            RoundingMode::Nearest1 => "NEAREST_1",
            RoundingMode::Nearest5 => "NEAREST_5",
            RoundingMode::Nearest10 => "NEAREST_10",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        RoundingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown rounding mode '{}' (expected NONE, NEAREST_1, NEAREST_5 or NEAREST_10)",
                    s
                )
            })
    }
}

/// Guardrail settings resolved by the host from tenant configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailPolicy {
    /// Minimum acceptable (price - cost) / price, in percent.
    pub min_margin_pct: Decimal,
    /// Maximum move away from the current price, in percent.
    pub max_change_pct: Decimal,
    pub rounding_mode: RoundingMode,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        GuardrailPolicy {
            min_margin_pct: Decimal::TEN,
            max_change_pct: Decimal::from(15),
            rounding_mode: RoundingMode::Nearest1,
        }
    }
}

impl GuardrailPolicy {
    pub fn new(min_margin_pct: Decimal, max_change_pct: Decimal, rounding_mode: RoundingMode) -> Self {
        GuardrailPolicy {
            min_margin_pct,
            max_change_pct,
            rounding_mode,
        }
    }

    /// Check every scalar against its allowed range.
    ///
    /// The enforcer does not depend on this: a `min_margin_pct` of 100 or more
    /// still yields a BLOCKED result rather than a panic.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let hundred = Decimal::ONE_HUNDRED;

        if self.min_margin_pct < Decimal::ZERO || self.min_margin_pct >= hundred {
            errors.push(format!(
                "min_margin_pct must be in [0, 100), got {}",
                self.min_margin_pct
            ));
        }
        if self.max_change_pct < Decimal::ZERO {
            errors.push(format!(
                "max_change_pct must be >= 0, got {}",
                self.max_change_pct
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
