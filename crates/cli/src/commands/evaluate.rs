use std::process;

use priceguard_engine::types::ActionDetails;
use priceguard_engine::Recommendation;

use super::guardrail_lines;
use crate::config::PolicyArgs;
use crate::input::InputArgs;
use crate::{fail, print_json, resolve_policy_or_exit, OutputFormat, EXIT_BLOCKED};

pub(crate) fn cmd_evaluate(
    inputs: &InputArgs,
    policy_args: &PolicyArgs,
    fail_on_blocked: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let policy = resolve_policy_or_exit(policy_args, output, quiet);
    let loaded = inputs
        .load()
        .unwrap_or_else(|e| fail(&e, output, quiet));

    let recommendations =
        match priceguard_engine::evaluate(&loaded.event, &loaded.sku, &loaded.rules, &policy) {
            Ok(recs) => recs,
            Err(e) => fail(&format!("evaluation failed: {}", e), output, quiet),
        };

    for rec in &recommendations {
        log_recommendation(rec);
    }

    match output {
        OutputFormat::Json => print_json(&recommendations),
        OutputFormat::Text => {
            if !quiet {
                print_text(&recommendations);
            }
        }
    }

    if fail_on_blocked && recommendations.iter().any(Recommendation::is_blocked) {
        process::exit(EXIT_BLOCKED);
    }
}

fn log_recommendation(rec: &Recommendation) {
    let action = &rec.action;
    match &rec.guardrail {
        Some(g) if g.is_blocked() => tracing::warn!(
            rule_id = %action.rule_id,
            action = %action.action_type,
            price = %g.suggested_price_original,
            reason = %g.safety_reason.map(|r| r.as_str()).unwrap_or_default(),
            "recommendation blocked by guardrails"
        ),
        Some(g) => tracing::info!(
            rule_id = %action.rule_id,
            action = %action.action_type,
            original = %g.suggested_price_original,
            final_price = %g.suggested_price_final,
            adjusted = g.adjusted,
            "price recommendation"
        ),
        None => tracing::info!(
            rule_id = %action.rule_id,
            action = %action.action_type,
            "notification recommendation"
        ),
    }
}

fn print_text(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("no rules matched");
        return;
    }
    for rec in recommendations {
        let action = &rec.action;
        println!(
            "{}  {}  {} ({})",
            action.rule_id, action.action_type, action.title, action.reason
        );
        match &action.details {
            ActionDetails::Price(p) => {
                println!(
                    "    current {} suggested {} (delta {})",
                    p.current_price, p.suggested_price, p.delta
                );
            }
            ActionDetails::Notify(n) => {
                if let (Some(available), Some(threshold)) = (n.available, n.threshold) {
                    println!("    available {} threshold {}", available, threshold);
                }
                if let Some(message) = &n.message {
                    println!("    {}", message);
                }
            }
        }
        if let Some(guardrail) = &rec.guardrail {
            for line in guardrail_lines(guardrail, "    ") {
                println!("{}", line);
            }
        }
    }
}
