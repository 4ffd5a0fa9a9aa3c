use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use lumen_core::error::{LumenError, Result};

use super::{metric_refs, parse_duration};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFile {
    pub groups: Vec<RuleGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleGroup {
    pub name: String,

    /// Evaluation interval override, collector duration syntax.
    #[serde(default)]
    pub interval: Option<String>,

    pub rules: Vec<AlertRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertRule {
    pub alert: String,
    pub expr: String,

    /// How long the condition must hold before firing.
    #[serde(default, rename = "for")]
    pub hold: Option<String>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

/// A validated rule, flattened out of its group.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledRule {
    pub group: String,
    pub name: String,
    pub expr: String,
    pub hold_seconds: u64,
    pub severity: Severity,
    pub metric_refs: Vec<String>,
}

impl RuleFile {
    pub fn compile(&self) -> Result<Vec<CompiledRule>> {
        if self.groups.is_empty() {
            return Err(LumenError::Configuration("rule file has no groups".into()));
        }

        let mut out = Vec::new();
        let mut group_names = HashSet::new();
        for g in &self.groups {
            if g.name.trim().is_empty() {
                return Err(LumenError::Configuration("rule group name must not be empty".into()));
            }
            if !group_names.insert(g.name.as_str()) {
                return Err(LumenError::Configuration(format!("duplicate rule group {:?}", g.name)));
            }
            if let Some(interval) = &g.interval {
                parse_duration(interval)?;
            }

            let mut alert_names = HashSet::new();
            for r in &g.rules {
                if !alert_names.insert(r.alert.as_str()) {
                    return Err(LumenError::Configuration(format!(
                        "group {}: duplicate alert {:?}",
                        g.name, r.alert
                    )));
                }
                out.push(r.compile(&g.name)?);
            }
        }
        Ok(out)
    }
}

impl AlertRule {
    fn compile(&self, group: &str) -> Result<CompiledRule> {
        let ctx = |msg: &str| {
            LumenError::Configuration(format!("alert {group}/{}: {msg}", self.alert))
        };

        if self.alert.trim().is_empty() {
            return Err(ctx("alert name must not be empty"));
        }
        if self.expr.trim().is_empty() {
            return Err(ctx("expr must not be empty"));
        }
        let hold = match &self.hold {
            Some(d) => parse_duration(d)?,
            None => std::time::Duration::ZERO,
        };
        let severity = match self.labels.get("severity") {
            Some(s) => Severity::parse(s)
                .ok_or_else(|| ctx("labels.severity must be info, warning or critical"))?,
            None => return Err(ctx("labels.severity is required")),
        };

        Ok(CompiledRule {
            group: group.to_string(),
            name: self.alert.clone(),
            expr: self.expr.trim().to_string(),
            hold_seconds: hold.as_secs(),
            severity,
            metric_refs: metric_refs(&self.expr),
        })
    }
}
