//! Loading event, SKU and rule-set JSON files.

use std::path::{Path, PathBuf};

use clap::Args;
use priceguard_engine::{Event, Rule, SkuSnapshot};
use serde::de::DeserializeOwned;

/// The three documents one evaluation needs.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Event JSON file
    #[arg(long)]
    pub event: PathBuf,

    /// SKU snapshot JSON file
    #[arg(long)]
    pub sku: PathBuf,

    /// Rule set JSON file (an array of rules)
    #[arg(long)]
    pub rules: PathBuf,
}

pub struct Inputs {
    pub event: Event,
    pub sku: SkuSnapshot,
    pub rules: Vec<Rule>,
}

/// Read `path` and parse it as JSON.
pub fn read_json_value(path: &Path) -> Result<serde_json::Value, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("error parsing JSON in '{}': {}", path.display(), e))
}

/// Read `path` and deserialize it as a `what` document.
pub fn read_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, String> {
    let value = read_json_value(path)?;
    let doc = serde_json::from_value(value)
        .map_err(|e| format!("invalid {} in '{}': {}", what, path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded {}", what);
    Ok(doc)
}

impl InputArgs {
    pub fn load(&self) -> Result<Inputs, String> {
        let event: Event = read_document(&self.event, "event")?;
        let sku: SkuSnapshot = read_document(&self.sku, "SKU snapshot")?;
        let rules: Vec<Rule> = read_document(&self.rules, "rule set")?;
        tracing::debug!(
            event_type = %event.event_type(),
            sku_id = event.sku_id(),
            rules = rules.len(),
            "inputs loaded"
        );
        Ok(Inputs { event, sku, rules })
    }
}
