//! Strict reader for the text exposition format.
//!
//! Accepts `name value`, `name{k="v",...} value` and an optional trailing
//! integer timestamp. `#` lines and blank lines are skipped.

use crate::error::{LumenError, Result};
use crate::metrics::labels::{is_valid_label_name, is_valid_metric_name};

/// One parsed sample line.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sorted label pairs; the identity of a series.
    pub fn label_key(&self) -> Vec<(String, String)> {
        let mut key = self.labels.clone();
        key.sort();
        key
    }
}

/// Parse a full exposition body.
pub fn parse(text: &str) -> Result<Vec<Sample>> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let sample = parse_line(line)
            .map_err(|msg| LumenError::Validation(format!("line {}: {msg}: {line:?}", i + 1)))?;
        out.push(sample);
    }
    Ok(out)
}

/// Find a sample by name and exact label set (order-insensitive).
pub fn find(samples: &[Sample], name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    let mut want: Vec<(&str, &str)> = labels.to_vec();
    want.sort();
    samples
        .iter()
        .find(|s| {
            if s.name != name || s.labels.len() != want.len() {
                return false;
            }
            let mut have: Vec<(&str, &str)> = s
                .labels
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            have.sort();
            have == want
        })
        .map(|s| s.value)
}

struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.s[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, want: char) -> std::result::Result<(), String> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(format!("expected {want:?}, found {c:?}")),
            None => Err(format!("expected {want:?}, found end of line")),
        }
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.s[start..self.pos]
    }

    fn rest(&self) -> &'a str {
        &self.s[self.pos..]
    }
}

fn parse_line(line: &str) -> std::result::Result<Sample, String> {
    let mut cur = Cursor { s: line, pos: 0 };

    let name = cur.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':');
    if !is_valid_metric_name(name) {
        return Err("invalid metric name".into());
    }

    let mut labels = Vec::new();
    if cur.peek() == Some('{') {
        cur.bump();
        loop {
            if cur.peek() == Some('}') {
                cur.bump();
                break;
            }
            let key = cur.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            if !is_valid_label_name(key) && key != "__name__" {
                return Err("invalid label name".into());
            }
            if labels.iter().any(|(k, _): &(String, String)| k == key) {
                return Err(format!("duplicate label {key:?}"));
            }
            cur.eat('=')?;
            cur.eat('"')?;
            let value = parse_label_value(&mut cur)?;
            labels.push((key.to_string(), value));
            match cur.bump() {
                Some(',') => continue,
                Some('}') => break,
                Some(c) => return Err(format!("expected ',' or '}}', found {c:?}")),
                None => return Err("unterminated label set".into()),
            }
        }
    }

    if !cur.peek().is_some_and(|c| c == ' ' || c == '\t') {
        return Err("expected whitespace before value".into());
    }
    let mut parts = cur.rest().split_whitespace();
    let value = parts
        .next()
        .ok_or_else(|| "missing value".to_string())
        .and_then(parse_value)?;
    if let Some(ts) = parts.next() {
        ts.parse::<i64>()
            .map_err(|_| format!("invalid timestamp {ts:?}"))?;
    }
    if parts.next().is_some() {
        return Err("trailing data after value".into());
    }

    Ok(Sample {
        name: name.to_string(),
        labels,
        value,
    })
}

fn parse_label_value(cur: &mut Cursor<'_>) -> std::result::Result<String, String> {
    let mut out = String::new();
    loop {
        match cur.bump() {
            Some('"') => return Ok(out),
            Some('\\') => match cur.bump() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some(c) => return Err(format!("invalid escape \\{c}")),
                None => return Err("unterminated escape".into()),
            },
            Some(c) => out.push(c),
            None => return Err("unterminated label value".into()),
        }
    }
}

fn parse_value(s: &str) -> std::result::Result<f64, String> {
    match s {
        "+Inf" | "Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        _ => s.parse::<f64>().map_err(|_| format!("invalid value {s:?}")),
    }
}
