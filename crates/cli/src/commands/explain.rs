use priceguard_engine::{explain_matches, MatchOutcome};

use crate::input::InputArgs;
use crate::{fail, print_json, OutputFormat};

pub(crate) fn cmd_explain(inputs: &InputArgs, output: OutputFormat, quiet: bool) {
    let loaded = inputs
        .load()
        .unwrap_or_else(|e| fail(&e, output, quiet));

    let traces = explain_matches(&loaded.event, &loaded.sku, &loaded.rules);
    let matched = traces
        .iter()
        .filter(|t| t.outcome == MatchOutcome::Matched)
        .count();
    tracing::info!(rules = traces.len(), matched, "explained rule matches");

    match output {
        OutputFormat::Json => print_json(&traces),
        OutputFormat::Text => {
            if quiet {
                return;
            }
            println!(
                "{} event for {}: {} of {} rules matched",
                loaded.event.event_type(),
                loaded.event.sku_id(),
                matched,
                traces.len()
            );
            for trace in &traces {
                let mark = if trace.outcome == MatchOutcome::Matched {
                    "+"
                } else {
                    "-"
                };
                println!(
                    "  {} {} ({}): {}",
                    mark,
                    trace.rule_id,
                    trace.rule_name,
                    trace.outcome.describe()
                );
            }
        }
    }
}
