//! Pricing decision engine -- matches business events against tenant rules,
//! proposes actions, and runs every proposed price through guardrails.
//!
//! Data flows one way:
//! event + rules -> [`matcher`] -> [`synthesize`] -> (per price action)
//! [`guardrail`] -> recommendations.
//!
//! The engine is synchronous, pure and stateless. It performs no I/O and no
//! logging; hosts persist and report its output. [`guardrail::enforce`] is
//! also exposed on its own so hosts can re-validate a price at execution time
//! or check a manually entered price.

pub mod condition;
pub mod guardrail;
pub mod matcher;
pub mod numeric;
pub mod path;
pub mod synthesize;
pub mod types;

pub use guardrail::{enforce, BlockReason, GuardrailResult, MaxChangeBand, SafetyStatus};
pub use matcher::{explain_matches, match_rules, MatchOutcome, MatchTrace};
pub use types::{
    EngineError, Event, EventType, GuardrailPolicy, Recommendation, RoundingMode, Rule,
    SkuSnapshot, SuggestedAction,
};

/// Run the full pipeline for one event.
///
/// Returns one recommendation per matched rule, in rule order. Price-changing
/// actions carry a guardrail result computed against `sku` and `policy`.
pub fn evaluate(
    event: &Event,
    sku: &SkuSnapshot,
    rules: &[Rule],
    policy: &GuardrailPolicy,
) -> Result<Vec<Recommendation>, EngineError> {
    let matched = match_rules(event, sku, rules);
    let actions = synthesize::synthesize_actions(&matched, event, sku)?;

    Ok(actions
        .into_iter()
        .map(|action| {
            let guardrail = action
                .suggested_price()
                .map(|price| enforce(sku.cost, sku.current_price, price, policy));
            Recommendation { action, guardrail }
        })
        .collect())
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
