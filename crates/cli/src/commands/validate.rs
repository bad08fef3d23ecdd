use std::collections::BTreeSet;
use std::path::Path;
use std::process;

use priceguard_engine::Rule;

use crate::input::read_json_value;
use crate::{fail, OutputFormat};

static RULES_SCHEMA_STR: &str = include_str!("../../schema/rules-schema.json");

pub(crate) fn cmd_validate(rules_path: &Path, output: OutputFormat, quiet: bool) {
    let schema: serde_json::Value = match serde_json::from_str(RULES_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => fail(
            &format!("internal error: failed to parse embedded rules schema: {}", e),
            output,
            quiet,
        ),
    };
    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => fail(
            &format!("internal error: failed to compile schema: {}", e),
            output,
            quiet,
        ),
    };

    let doc = read_json_value(rules_path).unwrap_or_else(|e| fail(&e, output, quiet));

    let mut errors: Vec<String> = validator
        .iter_errors(&doc)
        .map(|e| format!("{}", e))
        .collect();
    let mut rule_count = 0;
    if errors.is_empty() {
        match check_rules(&doc) {
            Ok(count) => rule_count = count,
            Err(rule_errors) => errors.extend(rule_errors),
        }
    }
    tracing::debug!(path = %rules_path.display(), errors = errors.len(), "validated rule set");

    if errors.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid ({} rules)", rule_count),
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "valid": true, "rules": rule_count }));
                }
            }
        }
    } else {
        match output {
            OutputFormat::Text => {
                if !quiet {
                    eprintln!("invalid rule set");
                    for err in &errors {
                        eprintln!("  - {}", err);
                    }
                }
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&json).unwrap_or_default()
                );
            }
        }
        process::exit(1);
    }
}

/// Checks beyond the schema: each rule parses into the engine's model, its
/// action template fits its event type, and rule ids are unique.
fn check_rules(doc: &serde_json::Value) -> Result<usize, Vec<String>> {
    let items = doc.as_array().map(Vec::as_slice).unwrap_or_default();
    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();

    for (index, item) in items.iter().enumerate() {
        match Rule::from_json(item) {
            Ok(rule) => {
                if let Err(e) = rule.check_template() {
                    errors.push(format!("rules[{}]: {}", index, e));
                }
                if !seen.insert(rule.id.clone()) {
                    errors.push(format!("rules[{}]: duplicate rule id '{}'", index, rule.id));
                }
            }
            Err(e) => errors.push(format!("rules[{}]: {}", index, e)),
        }
    }

    if errors.is_empty() {
        Ok(items.len())
    } else {
        Err(errors)
    }
}
