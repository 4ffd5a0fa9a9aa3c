//! Label schemas and the typed label contract.
//!
//! A family declares its label names once, in order. Call sites either pass
//! values positionally (checked for count) or implement [`LabelSet`], whose
//! names are checked against the schema so a reordered call site fails fast
//! instead of silently mislabeling a series.

use crate::error::{LumenError, Result};

/// Typed label values for one call site.
///
/// ```
/// use lumen_core::LabelSet;
///
/// struct Route<'a> { route: &'a str, method: &'a str }
///
/// impl LabelSet for Route<'_> {
///     const NAMES: &'static [&'static str] = &["route", "method"];
///     fn values(&self) -> Vec<&str> { vec![self.route, self.method] }
/// }
/// ```
pub trait LabelSet {
    /// Label names, in the order `values` returns them.
    const NAMES: &'static [&'static str];

    fn values(&self) -> Vec<&str>;
}

/// Ordered label names of a family.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelSchema {
    names: Vec<String>,
}

impl LabelSchema {
    /// Validate and build a schema. Errors are `Configuration`: schemas are
    /// declared at registration time.
    pub fn new(names: &[&str]) -> Result<Self> {
        let mut out: Vec<String> = Vec::with_capacity(names.len());
        for n in names {
            if !is_valid_label_name(n) {
                return Err(LumenError::Configuration(format!("invalid label name: {n:?}")));
            }
            if out.iter().any(|s| s == n) {
                return Err(LumenError::Configuration(format!("duplicate label name: {n:?}")));
            }
            out.push((*n).to_string());
        }
        Ok(Self { names: out })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Whether `names` matches this schema exactly, order included.
    pub fn matches(&self, names: &[&str]) -> bool {
        self.names.len() == names.len() && self.names.iter().zip(names).all(|(a, b)| a == b)
    }

    /// Check positional values and build the series key.
    pub fn key(&self, metric: &str, values: &[&str]) -> Result<Vec<String>> {
        if values.len() != self.names.len() {
            return Err(LumenError::Validation(format!(
                "{metric}: expected {} label values [{}], got {}",
                self.names.len(),
                self.names.join(","),
                values.len()
            )));
        }
        Ok(values.iter().map(|v| (*v).to_string()).collect())
    }

    /// Check a typed label set against the schema and return its values.
    pub fn check<'a, L: LabelSet>(&self, metric: &str, labels: &'a L) -> Result<Vec<&'a str>> {
        if !self.matches(L::NAMES) {
            return Err(LumenError::Validation(format!(
                "{metric}: label set [{}] does not match schema [{}]",
                L::NAMES.join(","),
                self.names.join(",")
            )));
        }
        Ok(labels.values())
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, and not starting with `__` (reserved).
pub fn is_valid_label_name(s: &str) -> bool {
    if s.starts_with("__") {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
