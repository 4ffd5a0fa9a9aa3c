#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use lumen_core::error::ClientCode;
use lumen_core::{LabelSet, LumenError, MetricKind, Registry, RegistryOptions};

struct RouteLabels<'a> {
    route: &'a str,
    method: &'a str,
}

impl LabelSet for RouteLabels<'_> {
    const NAMES: &'static [&'static str] = &["route", "method"];
    fn values(&self) -> Vec<&str> {
        vec![self.route, self.method]
    }
}

struct Reversed<'a> {
    method: &'a str,
    route: &'a str,
}

impl LabelSet for Reversed<'_> {
    const NAMES: &'static [&'static str] = &["method", "route"];
    fn values(&self) -> Vec<&str> {
        vec![self.method, self.route]
    }
}

fn is_config(err: &LumenError) -> bool {
    err.client_code() == ClientCode::Configuration
}

fn is_validation(err: &LumenError) -> bool {
    err.client_code() == ClientCode::Validation
}

#[test]
fn get_or_create_returns_same_instance() {
    let reg = Registry::default();
    let a = reg
        .get_or_create(MetricKind::Counter, "jobs_total", "Jobs.", &["queue"])
        .unwrap();
    let b = reg
        .get_or_create(MetricKind::Counter, "jobs_total", "Jobs.", &["queue"])
        .unwrap();
    assert!(a.ptr_eq(&b));
    assert_eq!(reg.len(), 1);

    a.as_counter().unwrap().inc_by(&["q1"], 4).unwrap();
    assert_eq!(b.as_counter().unwrap().get(&["q1"]).unwrap(), 4);
}

#[test]
fn conflicting_kind_is_configuration_error() {
    let reg = Registry::default();
    reg.counter("jobs_total", "Jobs.", &["queue"]).unwrap();
    let err = reg.gauge("jobs_total", "Jobs.", &["queue"]).err().unwrap();
    assert!(is_config(&err), "{err}");
    let err = reg
        .get_or_create(MetricKind::Histogram, "jobs_total", "Jobs.", &["queue"])
        .err()
        .unwrap();
    assert!(is_config(&err), "{err}");
}

#[test]
fn conflicting_labels_is_configuration_error() {
    let reg = Registry::default();
    reg.counter("jobs_total", "Jobs.", &["queue", "tenant"]).unwrap();
    assert!(is_config(&reg.counter("jobs_total", "Jobs.", &["queue"]).err().unwrap()));
    // Order is part of the schema.
    assert!(is_config(
        &reg.counter("jobs_total", "Jobs.", &["tenant", "queue"]).err().unwrap()
    ));
}

#[test]
fn conflicting_buckets_is_configuration_error() {
    let reg = Registry::default();
    reg.histogram_with_buckets("lat_seconds", "Latency.", &[], &[0.1, 1.0])
        .unwrap();
    let err = reg
        .histogram_with_buckets("lat_seconds", "Latency.", &[], &[0.5, 1.0])
        .err()
        .unwrap();
    assert!(is_config(&err));
}

#[test]
fn invalid_names_are_rejected() {
    let reg = Registry::default();
    assert!(is_config(&reg.counter("1bad", "x", &[]).err().unwrap()));
    assert!(is_config(&reg.counter("has-dash", "x", &[]).err().unwrap()));
    assert!(is_config(&reg.counter("ok_total", "x", &["__reserved"]).err().unwrap()));
    assert!(is_config(&reg.counter("ok_total", "x", &["a", "a"]).err().unwrap()));
    assert!(is_config(&reg.histogram("lat", "x", &["le"]).err().unwrap()));
    assert!(reg.is_empty());
}

#[test]
fn bad_buckets_are_rejected() {
    let reg = Registry::default();
    for bounds in [&[][..], &[1.0, 1.0][..], &[2.0, 1.0][..], &[f64::INFINITY][..]] {
        let err = reg
            .histogram_with_buckets("lat_seconds", "x", &[], bounds)
            .err()
            .unwrap();
        assert!(is_config(&err), "{bounds:?}");
    }
}

#[test]
fn derived_sample_names_cannot_collide() {
    let reg = Registry::default();
    reg.histogram("rpc_seconds", "RPC latency.", &[]).unwrap();
    assert!(is_config(&reg.counter("rpc_seconds_count", "x", &[]).err().unwrap()));

    reg.gauge("queue_sum", "x", &[]).unwrap();
    assert!(is_config(&reg.histogram("queue", "x", &[]).err().unwrap()));
}

#[test]
fn counter_is_sum_of_deltas() {
    let reg = Registry::default();
    let c = reg.counter("events_total", "Events.", &["kind"]).unwrap();
    let deltas = [1, 0, 5, 2, 10, 1];
    let mut last = 0;
    for d in deltas {
        c.inc_by(&["a"], d).unwrap();
        let now = c.get(&["a"]).unwrap();
        assert!(now >= last);
        last = now;
    }
    assert_eq!(last, deltas.iter().sum::<i64>() as u64);
    assert_eq!(c.get(&["b"]).unwrap(), 0);
}

#[test]
fn counter_overflow_is_rejected_and_never_decreases() {
    let reg = Registry::default();
    let c = reg.counter("bytes_total", "Bytes.", &[]).unwrap();
    c.inc_by(&[], i64::MAX).unwrap();
    c.inc_by(&[], i64::MAX).unwrap();
    let before = c.get(&[]).unwrap();
    assert_eq!(before, u64::MAX - 1);

    assert!(is_validation(&c.inc_by(&[], i64::MAX).err().unwrap()));
    assert!(is_validation(&c.inc_by(&[], 2).err().unwrap()));
    assert_eq!(c.get(&[]).unwrap(), before);

    c.inc(&[]).unwrap();
    assert_eq!(c.get(&[]).unwrap(), u64::MAX);
}

#[test]
fn gauge_overflow_is_rejected() {
    let reg = Registry::default();
    let g = reg.gauge("level", "Level.", &[]).unwrap();
    g.set(&[], i64::MAX).unwrap();
    assert!(is_validation(&g.inc(&[]).err().unwrap()));
    assert_eq!(g.get(&[]).unwrap(), i64::MAX);

    g.set(&[], i64::MIN).unwrap();
    assert!(is_validation(&g.dec(&[]).err().unwrap()));
    assert_eq!(g.get(&[]).unwrap(), i64::MIN);
}

#[test]
fn validation_errors_leave_state_untouched() {
    let reg = Registry::default();
    let c = reg.counter("events_total", "Events.", &["kind"]).unwrap();
    c.inc_by(&["a"], 3).unwrap();

    assert!(is_validation(&c.inc_by(&["a"], -1).err().unwrap()));
    assert!(is_validation(&c.inc(&[]).err().unwrap()));
    assert!(is_validation(&c.inc(&["a", "b"]).err().unwrap()));

    assert_eq!(c.get(&["a"]).unwrap(), 3);
    assert!(!reg.snapshot().contains("events_total{kind=\"b\"}"));
}

#[test]
fn typed_label_sets_must_match_schema_order() {
    let reg = Registry::default();
    let c = reg
        .counter("http_requests_total", "Requests.", RouteLabels::NAMES)
        .unwrap();
    c.inc_labels(&RouteLabels { route: "/", method: "GET" }, 1)
        .unwrap();
    assert_eq!(c.get(&["/", "GET"]).unwrap(), 1);

    let err = c
        .inc_labels(&Reversed { method: "GET", route: "/" }, 1)
        .err()
        .unwrap();
    assert!(is_validation(&err));
    assert_eq!(c.get(&["/", "GET"]).unwrap(), 1);
    assert_eq!(c.get(&["GET", "/"]).unwrap(), 0);
}

#[test]
fn gauge_moves_both_ways() {
    let reg = Registry::default();
    let g = reg.gauge("workers", "Workers.", &["pool"]).unwrap();
    g.inc(&["p"]).unwrap();
    g.inc(&["p"]).unwrap();
    g.dec(&["p"]).unwrap();
    assert_eq!(g.get(&["p"]).unwrap(), 1);
    g.add(&["p"], -5).unwrap();
    assert_eq!(g.get(&["p"]).unwrap(), -4);
    g.set(&["p"], 42).unwrap();
    assert_eq!(g.get(&["p"]).unwrap(), 42);
}

#[test]
fn histogram_observation_lands_in_one_bucket() {
    let reg = Registry::default();
    let h = reg
        .histogram_with_buckets("lat_seconds", "Latency.", &["op"], &[0.1, 0.5, 1.0])
        .unwrap();

    // (value, expected bucket index; 3 = overflow)
    let cases = [(0.05, 0), (0.1, 0), (0.2, 1), (0.5, 1), (0.99, 2), (1.0, 2), (7.0, 3), (-1.0, 0)];
    let mut sum = 0.0;
    for (i, (v, idx)) in cases.iter().enumerate() {
        let before = h.snapshot(&["x"]).unwrap();
        h.observe(&["x"], *v).unwrap();
        sum += v;
        let after = h.snapshot(&["x"]).unwrap().unwrap();

        let prev_counts: Vec<u64> = match &before {
            Some(s) => s.buckets.iter().map(|(_, c)| *c).chain([s.overflow]).collect(),
            None => vec![0; 4],
        };
        let counts: Vec<u64> = after.buckets.iter().map(|(_, c)| *c).chain([after.overflow]).collect();
        for j in 0..4 {
            let expected = prev_counts[j] + u64::from(j == *idx);
            assert_eq!(counts[j], expected, "value {v} bucket {j}");
        }
        assert_eq!(after.count, i as u64 + 1);
        assert!((after.sum - sum).abs() < 1e-9);
    }
}

#[test]
fn histogram_rejects_non_finite_values() {
    let reg = Registry::default();
    let h = reg.histogram("lat_seconds", "Latency.", &[]).unwrap();
    h.observe(&[], 0.25).unwrap();
    for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(is_validation(&h.observe(&[], v).err().unwrap()), "{v}");
    }
    let snap = h.snapshot(&[]).unwrap().unwrap();
    assert_eq!(snap.count, 1);
    assert_eq!(snap.sum, 0.25);
    assert!(reg.snapshot().contains("\nlat_seconds_sum 0.25\n"));
}

#[test]
fn label_less_families_exist_from_registration() {
    let reg = Registry::default();
    let c = reg.counter("boots_total", "Boots.", &[]).unwrap();
    assert_eq!(c.get(&[]).unwrap(), 0);
    assert!(reg.snapshot().contains("\nboots_total 0\n"));
}

#[test]
fn registry_options_set_default_buckets() {
    let reg = Registry::new(RegistryOptions {
        default_buckets: vec![1.0, 2.0],
        series_warn_threshold: 10,
    });
    let h = reg.histogram("lat_seconds", "Latency.", &[]).unwrap();
    assert_eq!(h.bounds(), &[1.0, 2.0]);
}

#[test]
fn series_names_include_histogram_suffixes() {
    let reg = Registry::default();
    reg.counter("a_total", "A.", &[]).unwrap();
    reg.histogram("b_seconds", "B.", &[]).unwrap();
    assert_eq!(
        reg.series_names(),
        vec!["a_total", "b_seconds", "b_seconds_bucket", "b_seconds_count", "b_seconds_sum"]
    );
}
