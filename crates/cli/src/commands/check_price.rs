use rust_decimal::Decimal;

use super::guardrail_lines;
use crate::config::PolicyArgs;
use crate::{print_json, resolve_policy_or_exit, OutputFormat};

pub(crate) fn cmd_check_price(
    cost: Decimal,
    current: Decimal,
    price: Decimal,
    policy_args: &PolicyArgs,
    output: OutputFormat,
    quiet: bool,
) {
    let policy = resolve_policy_or_exit(policy_args, output, quiet);
    let result = priceguard_engine::enforce(cost, current, price, &policy);

    if result.is_blocked() {
        tracing::warn!(
            price = %result.suggested_price_original,
            reason = %result.safety_reason.map(|r| r.as_str()).unwrap_or_default(),
            "price blocked by guardrails"
        );
    }

    match output {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            if !quiet {
                for line in guardrail_lines(&result, "") {
                    println!("{}", line);
                }
            }
        }
    }
}
