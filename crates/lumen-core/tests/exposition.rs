#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;

use lumen_core::exposition::{find, parse};
use lumen_core::Registry;

fn populated() -> Registry {
    let reg = Registry::default();
    let c = reg
        .counter("http_requests_total", "Requests received.", &["route", "method"])
        .unwrap();
    c.inc_by(&["/b", "GET"], 2).unwrap();
    c.inc(&["/a", "POST"]).unwrap();

    let g = reg.gauge("queue_depth", "Queued jobs.", &[]).unwrap();
    g.set(&[], -3).unwrap();

    let h = reg
        .histogram_with_buckets("op_seconds", "Op latency.", &["op"], &[0.1, 1.0])
        .unwrap();
    h.observe(&["read"], 0.0625).unwrap();
    h.observe(&["read"], 0.5).unwrap();
    h.observe(&["read"], 3.0).unwrap();
    reg
}

#[test]
fn snapshot_text_layout() {
    let text = populated().snapshot();
    let expected = "\
# HELP http_requests_total Requests received.
# TYPE http_requests_total counter
http_requests_total{route=\"/a\",method=\"POST\"} 1
http_requests_total{route=\"/b\",method=\"GET\"} 2
# HELP op_seconds Op latency.
# TYPE op_seconds histogram
op_seconds_bucket{op=\"read\",le=\"0.1\"} 1
op_seconds_bucket{op=\"read\",le=\"1\"} 2
op_seconds_bucket{op=\"read\",le=\"+Inf\"} 3
op_seconds_sum{op=\"read\"} 3.5625
op_seconds_count{op=\"read\"} 3
# HELP queue_depth Queued jobs.
# TYPE queue_depth gauge
queue_depth -3
";
    assert_eq!(text, expected);
}

#[test]
fn snapshot_parses_without_duplicates() {
    let text = populated().snapshot();
    let samples = parse(&text).unwrap();
    assert_eq!(samples.len(), 2 + 5 + 1);

    let mut seen = HashSet::new();
    for s in &samples {
        assert!(seen.insert((s.name.clone(), s.label_key())), "duplicate {s:?}");
    }

    assert_eq!(
        find(&samples, "http_requests_total", &[("method", "GET"), ("route", "/b")]),
        Some(2.0)
    );
    assert_eq!(find(&samples, "op_seconds_count", &[("op", "read")]), Some(3.0));
    assert_eq!(
        find(&samples, "op_seconds_bucket", &[("op", "read"), ("le", "+Inf")]),
        Some(3.0)
    );
    assert_eq!(find(&samples, "queue_depth", &[]), Some(-3.0));
    assert_eq!(find(&samples, "queue_depth", &[("x", "y")]), None);
}

#[test]
fn label_values_and_help_are_escaped() {
    let reg = Registry::default();
    let c = reg.counter("odd_total", "Line one\nback\\slash", &["v"]).unwrap();
    c.inc(&["quote\" back\\ nl\n"]).unwrap();
    let text = reg.snapshot();
    assert!(text.contains("# HELP odd_total Line one\\nback\\\\slash\n"));
    assert!(text.contains("odd_total{v=\"quote\\\" back\\\\ nl\\n\"} 1\n"));

    let samples = parse(&text).unwrap();
    assert_eq!(samples[0].label("v"), Some("quote\" back\\ nl\n"));
}

#[test]
fn parse_accepts_timestamps_and_special_values() {
    let samples = parse("a 1 1700000000000\nb{x=\"1\",} +Inf\nc NaN\n\n# comment\n").unwrap();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].value, 1.0);
    assert!(samples[1].value.is_infinite());
    assert_eq!(samples[1].label("x"), Some("1"));
    assert!(samples[2].value.is_nan());
}

#[test]
fn parse_rejects_malformed_lines() {
    for bad in [
        "1abc 1",
        "abc",
        "abc{x=\"1\" 1",
        "abc{x=1} 1",
        "abc{x=\"1\",x=\"2\"} 1",
        "abc{x=\"\\q\"} 1",
        "abc one",
        "abc 1 2 3",
        "abc{x=\"1\"}1",
    ] {
        assert!(parse(bad).is_err(), "accepted {bad:?}");
    }
}
