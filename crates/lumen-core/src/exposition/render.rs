use std::fmt::Write;

/// Escape a label value: backslash, double quote, newline.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape help text: backslash and newline.
pub fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Float formatting with the collector's spelling of the special values.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{v}")
    }
}

/// `# HELP` and `# TYPE` lines.
pub fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Write `name{k="v",...}` (no value, no newline). `extra` is appended last,
/// which is where `le` goes on bucket lines.
pub fn series(
    out: &mut String,
    name: &str,
    names: &[String],
    values: &[String],
    extra: Option<(&str, &str)>,
) {
    out.push_str(name);
    let mut pairs = names
        .iter()
        .map(String::as_str)
        .zip(values.iter().map(String::as_str))
        .chain(extra)
        .peekable();
    if pairs.peek().is_none() {
        return;
    }
    out.push('{');
    let mut first = true;
    for (k, v) in pairs {
        if !first {
            out.push(',');
        }
        first = false;
        let _ = write!(out, "{}=\"{}\"", k, escape_label(v));
    }
    out.push('}');
}
