pub(crate) mod check_price;
pub(crate) mod evaluate;
pub(crate) mod explain;
pub(crate) mod validate;

use priceguard_engine::GuardrailResult;

/// Human-readable lines for one guardrail result, indented by `indent`.
pub(crate) fn guardrail_lines(result: &GuardrailResult, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    match result.safety_reason {
        Some(reason) if result.is_blocked() => {
            lines.push(format!(
                "{}BLOCKED at {}: {}",
                indent, result.suggested_price_original, reason
            ));
        }
        _ => {
            let margin = result
                .margin_pct_final
                .map(|m| format!(" (margin {}%)", m))
                .unwrap_or_default();
            lines.push(format!(
                "{}OK {} -> {}{}",
                indent, result.suggested_price_original, result.suggested_price_final, margin
            ));
        }
    }
    for reason in &result.reasons {
        lines.push(format!("{}  - {}", indent, reason));
    }
    lines
}
