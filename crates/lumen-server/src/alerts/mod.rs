//! Alert rule file shipped alongside the service.
//!
//! The collector evaluates these rules; this module only parses them
//! strictly, checks them, and verifies every metric they reference is one
//! this service actually exports, so a renamed metric cannot silently
//! disable an alert.

pub mod duration;
pub mod expr;
pub mod schema;

use std::fs;

use lumen_core::error::{LumenError, Result};
use lumen_core::Registry;

pub use duration::parse_duration;
pub use expr::metric_refs;
pub use schema::{AlertRule, CompiledRule, RuleFile, RuleGroup, Severity};

pub fn load_from_file(path: &str) -> Result<Vec<CompiledRule>> {
    let s = fs::read_to_string(path)
        .map_err(|e| LumenError::Configuration(format!("read rule file {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<Vec<CompiledRule>> {
    let file: RuleFile = serde_yaml::from_str(s)
        .map_err(|e| LumenError::Configuration(format!("invalid rule yaml: {e}")))?;
    file.compile()
}

/// Check every rule's metric references against the registry.
///
/// Unknown references are logged; with `fail_fast` the first one is a
/// `Configuration` error.
pub fn check_metric_refs(rules: &[CompiledRule], registry: &Registry, fail_fast: bool) -> Result<()> {
    let known = registry.series_names();
    for rule in rules {
        for m in &rule.metric_refs {
            if known.binary_search(m).is_ok() {
                continue;
            }
            tracing::warn!(group = %rule.group, alert = %rule.name, metric = %m, "alert rule references a metric this service does not export");
            if fail_fast {
                return Err(LumenError::Configuration(format!(
                    "alert {}/{} references unknown metric {m}",
                    rule.group, rule.name
                )));
            }
        }
    }
    Ok(())
}
