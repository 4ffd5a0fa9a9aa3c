//! Metric-name extraction from rule expressions.
//!
//! Not a query-language parser: it only finds the identifiers that name
//! series. Skipped: label matchers `{..}`, range/subquery selectors `[..]`,
//! string literals, numbers, function calls, keywords, and the label lists
//! after grouping modifiers (`by (route)`).

const KEYWORDS: &[&str] = &[
    "and", "or", "unless", "bool", "offset", "by", "without", "on", "ignoring", "group_left",
    "group_right", "inf", "nan",
    // Aggregations may be written `sum by (x) (...)`, so they are not always
    // directly followed by `(`.
    "sum", "avg", "min", "max", "count", "group", "stddev", "stdvar", "topk", "bottomk",
    "quantile", "count_values",
];

/// Modifiers followed by a parenthesised label list.
const GROUPING: &[&str] = &["by", "without", "on", "ignoring", "group_left", "group_right"];

/// Distinct metric names referenced by `expr`, in first-seen order.
pub fn metric_refs(expr: &str) -> Vec<String> {
    let chars: Vec<char> = expr.chars().collect();
    let mut out: Vec<String> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => i = skip_until(&chars, i, '}'),
            '[' => i = skip_until(&chars, i, ']'),
            '"' | '\'' | '`' => i = skip_string(&chars, i),
            c if c.is_ascii_digit() || c == '.' => {
                // Numbers, including exponents and durations like `5m`.
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                    i += 1;
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == ':')
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                let lower = ident.to_ascii_lowercase();

                let mut j = i;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                let next = chars.get(j).copied();

                if GROUPING.contains(&lower.as_str()) {
                    if next == Some('(') {
                        i = skip_until(&chars, j, ')');
                    }
                    continue;
                }
                if KEYWORDS.contains(&lower.as_str()) || next == Some('(') {
                    continue;
                }
                if !out.contains(&ident) {
                    out.push(ident);
                }
            }
            _ => i += 1,
        }
    }
    out
}

/// Index just past the matching `close` (or end of input).
fn skip_until(chars: &[char], open: usize, close: char) -> usize {
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '"' | '\'' | '`' => {
                i = skip_string(chars, i);
                continue;
            }
            c if c == close => return i + 1,
            _ => {}
        }
        i += 1;
    }
    i
}

fn skip_string(chars: &[char], open: usize) -> usize {
    let quote = chars[open];
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    i
}
