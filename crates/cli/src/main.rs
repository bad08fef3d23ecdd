mod commands;
mod config;
mod input;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use config::PolicyArgs;
use input::InputArgs;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Exit status when `--fail-on-blocked` sees a BLOCKED guardrail result.
pub(crate) const EXIT_BLOCKED: i32 = 2;

/// Pricing rules and guardrail engine.
#[derive(Parser)]
#[command(
    name = "priceguard",
    version,
    about = "Pricing rules and guardrail engine"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log filter, e.g. `debug` or `priceguard=info` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an event through the rule set and guardrails
    Evaluate {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Exit with status 2 if any guardrail result is BLOCKED
        #[arg(long)]
        fail_on_blocked: bool,
    },

    /// Run a single price through the guardrails
    CheckPrice {
        /// Unit cost
        #[arg(long)]
        cost: Decimal,
        /// Current selling price
        #[arg(long, allow_negative_numbers = true)]
        current: Decimal,
        /// Price to check
        #[arg(long)]
        price: Decimal,
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Show why each rule did or did not match an event
    Explain {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Validate a rule set file against the rule schema
    Validate {
        /// Path to the rule set JSON file
        rules: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.log_level.as_deref()) {
        report_error(&format!("error: {}", e), cli.output, cli.quiet);
        process::exit(1);
    }

    match cli.command {
        Commands::Evaluate {
            inputs,
            policy,
            fail_on_blocked,
        } => {
            commands::evaluate::cmd_evaluate(
                &inputs,
                &policy,
                fail_on_blocked,
                cli.output,
                cli.quiet,
            );
        }
        Commands::CheckPrice {
            cost,
            current,
            price,
            policy,
        } => {
            commands::check_price::cmd_check_price(
                cost, current, price, &policy, cli.output, cli.quiet,
            );
        }
        Commands::Explain { inputs } => {
            commands::explain::cmd_explain(&inputs, cli.output, cli.quiet);
        }
        Commands::Validate { rules } => {
            commands::validate::cmd_validate(&rules, cli.output, cli.quiet);
        }
    }
}

/// Report an error to stderr in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Report `msg` and exit with status 1.
pub(crate) fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}

/// Print a serializable value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(
            &format!("serialization error: {}", e),
            OutputFormat::Json,
            false,
        ),
    }
}

/// Resolve the policy or exit, listing every problem.
pub(crate) fn resolve_policy_or_exit(
    args: &PolicyArgs,
    output: OutputFormat,
    quiet: bool,
) -> priceguard_engine::GuardrailPolicy {
    match config::resolve_policy(args) {
        Ok(policy) => policy,
        Err(errors) => {
            let msg = match output {
                OutputFormat::Text => format!("invalid policy:\n  - {}", errors.join("\n  - ")),
                OutputFormat::Json => format!("invalid policy: {}", errors.join("; ")),
            };
            fail(&msg, output, quiet);
        }
    }
}
