//! Guardrail policy resolution for the CLI.
//!
//! The effective policy is layered: built-in defaults, then an optional TOML
//! policy file, then individual command-line flags. Every key is optional at
//! every layer.
//!
//! # Example
//!
//! ```toml
//! [guardrails]
//! min_margin_pct = 12.5
//! max_change_pct = 20
//! rounding_mode = "NEAREST_5"
//! ```

use std::path::{Path, PathBuf};

use clap::Args;
use priceguard_engine::{GuardrailPolicy, RoundingMode};
use rust_decimal::Decimal;
use serde::Deserialize;

// ── Types ─────────────────────────────────────────────────────────────────────

/// Top-level policy file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyFile {
    #[serde(default)]
    pub guardrails: GuardrailSettings,
}

/// `[guardrails]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardrailSettings {
    pub min_margin_pct: Option<Decimal>,
    pub max_change_pct: Option<Decimal>,
    /// Parsed leniently: `nearest-5` and `NEAREST_5` are the same mode.
    pub rounding_mode: Option<String>,
}

/// Policy flags shared by every command that runs the guardrail.
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyArgs {
    /// TOML file with a [guardrails] section
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Minimum margin in percent (overrides the policy file)
    #[arg(long, allow_negative_numbers = true)]
    pub min_margin: Option<Decimal>,

    /// Maximum change from the current price in percent (overrides the policy file)
    #[arg(long, allow_negative_numbers = true)]
    pub max_change: Option<Decimal>,

    /// Rounding mode: NONE, NEAREST_1, NEAREST_5 or NEAREST_10 (overrides the policy file)
    #[arg(long)]
    pub rounding: Option<RoundingMode>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a policy TOML file from `path`.
pub fn read_policy_file(path: &Path) -> Result<PolicyFile, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Apply a policy file's settings on top of `base`.
pub fn apply_settings(
    base: GuardrailPolicy,
    settings: &GuardrailSettings,
) -> Result<GuardrailPolicy, String> {
    let rounding_mode = match &settings.rounding_mode {
        Some(raw) => raw.parse::<RoundingMode>()?,
        None => base.rounding_mode,
    };
    Ok(GuardrailPolicy {
        min_margin_pct: settings.min_margin_pct.unwrap_or(base.min_margin_pct),
        max_change_pct: settings.max_change_pct.unwrap_or(base.max_change_pct),
        rounding_mode,
    })
}

/// Apply command-line overrides on top of `base`.
pub fn apply_flags(base: GuardrailPolicy, args: &PolicyArgs) -> GuardrailPolicy {
    GuardrailPolicy {
        min_margin_pct: args.min_margin.unwrap_or(base.min_margin_pct),
        max_change_pct: args.max_change.unwrap_or(base.max_change_pct),
        rounding_mode: args.rounding.unwrap_or(base.rounding_mode),
    }
}

/// Resolve and validate the effective policy for one invocation.
///
/// Returns every problem found, not just the first.
pub fn resolve_policy(args: &PolicyArgs) -> Result<GuardrailPolicy, Vec<String>> {
    let mut policy = GuardrailPolicy::default();

    if let Some(path) = &args.policy {
        let file = read_policy_file(path).map_err(|e| vec![e])?;
        policy = apply_settings(policy, &file.guardrails)
            .map_err(|e| vec![format!("{}: {}", path.display(), e)])?;
        tracing::debug!(path = %path.display(), "loaded policy file");
    }

    let policy = apply_flags(policy, args);
    policy.validate()?;

    tracing::debug!(
        min_margin_pct = %policy.min_margin_pct,
        max_change_pct = %policy.max_change_pct,
        rounding_mode = %policy.rounding_mode,
        "resolved guardrail policy"
    );
    Ok(policy)
}
