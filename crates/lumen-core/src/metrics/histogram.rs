//! Histogram family.
//!
//! Buckets are stored non-cumulatively: an observation lands in exactly one
//! bucket (smallest bound `>= value`) or in the overflow bucket. Exposition
//! turns them into the cumulative `le` form the collector expects.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{LumenError, Result};
use crate::exposition::render;

use super::{Desc, LabelSet, SeriesMap};

/// Default bounds in seconds, matching the collector's usual client defaults.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

struct HistogramCell {
    buckets: Box<[AtomicU64]>,
    overflow: AtomicU64,
    count: AtomicU64,
    sum_bits: AtomicU64,
}

impl HistogramCell {
    fn new(n: usize) -> Self {
        Self {
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
            overflow: AtomicU64::new(0),
            count: AtomicU64::new(0),
            sum_bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    fn observe(&self, bounds: &[f64], v: f64) {
        let idx = bounds.partition_point(|b| *b < v);
        match self.buckets.get(idx) {
            Some(b) => b.fetch_add(1, Ordering::Relaxed),
            None => self.overflow.fetch_add(1, Ordering::Relaxed),
        };
        add_f64(&self.sum_bits, v);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, bounds: &[f64]) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: bounds
                .iter()
                .zip(self.buckets.iter())
                .map(|(b, c)| (*b, c.load(Ordering::Relaxed)))
                .collect(),
            overflow: self.overflow.load(Ordering::Relaxed),
            sum: f64::from_bits(self.sum_bits.load(Ordering::Relaxed)),
            count: self.count.load(Ordering::Relaxed),
        }
    }
}

fn add_f64(cell: &AtomicU64, v: f64) {
    let mut cur = cell.load(Ordering::Relaxed);
    loop {
        let next = (f64::from_bits(cur) + v).to_bits();
        match cell.compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => cur = actual,
        }
    }
}

/// Point-in-time view of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, observations in this bucket only)`.
    pub buckets: Vec<(f64, u64)>,
    /// Observations above the last bound.
    pub overflow: u64,
    pub sum: f64,
    pub count: u64,
}

impl HistogramSnapshot {
    /// Cumulative `(le, count)` pairs, ending with `+Inf`.
    pub fn cumulative(&self) -> Vec<(f64, u64)> {
        let mut acc = 0;
        let mut out: Vec<(f64, u64)> = self
            .buckets
            .iter()
            .map(|(b, c)| {
                acc += c;
                (*b, acc)
            })
            .collect();
        out.push((f64::INFINITY, acc + self.overflow));
        out
    }
}

/// Histogram family over fixed bucket bounds.
#[derive(Clone)]
pub struct Histogram {
    inner: Arc<SeriesMap<HistogramCell>>,
    bounds: Arc<[f64]>,
}

impl Histogram {
    pub(crate) fn new(desc: Desc, bounds: &[f64], warn_threshold: usize) -> Result<Self> {
        validate_bounds(desc.name(), bounds)?;
        if desc.schema().contains("le") {
            return Err(LumenError::Configuration(format!(
                "{}: label \"le\" is reserved for histogram buckets",
                desc.name()
            )));
        }
        Ok(Self {
            inner: Arc::new(SeriesMap::new(desc, warn_threshold)),
            bounds: bounds.into(),
        })
    }

    pub fn desc(&self) -> &Desc {
        self.inner.desc()
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation. Non-finite values are rejected: one `+Inf`
    /// and one `-Inf` would turn the running sum into NaN for good.
    pub fn observe(&self, values: &[&str], v: f64) -> Result<()> {
        if !v.is_finite() {
            return Err(LumenError::Validation(format!(
                "{}: cannot observe non-finite value {v}",
                self.desc().name()
            )));
        }
        let n = self.bounds.len();
        self.inner
            .with(values, || HistogramCell::new(n), |h| h.observe(&self.bounds, v))
    }

    pub fn observe_labels<L: LabelSet>(&self, labels: &L, v: f64) -> Result<()> {
        let values = self.desc().schema().check(self.desc().name(), labels)?;
        self.observe(&values, v)
    }

    /// `None` for a series never observed.
    pub fn snapshot(&self, values: &[&str]) -> Result<Option<HistogramSnapshot>> {
        self.inner.read(values, |h| h.snapshot(&self.bounds))
    }

    pub(crate) fn touch(&self) -> Result<()> {
        let n = self.bounds.len();
        self.inner.with(&[], || HistogramCell::new(n), |_| ())
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn render(&self, out: &mut String) {
        let desc = self.desc();
        let name = desc.name();
        let names = desc.schema().names();
        render::header(out, name, desc.help(), "histogram");

        let bucket = format!("{name}_bucket");
        let sum = format!("{name}_sum");
        let count = format!("{name}_count");
        for (key, snap) in self.inner.collect(|h| h.snapshot(&self.bounds)) {
            let cumulative = snap.cumulative();
            let total = cumulative.last().map(|(_, c)| *c).unwrap_or(0);
            for (le, c) in &cumulative {
                let le = render::format_float(*le);
                render::series(out, &bucket, names, &key, Some(("le", le.as_str())));
                let _ = writeln!(out, " {c}");
            }
            render::series(out, &sum, names, &key, None);
            let _ = writeln!(out, " {}", render::format_float(snap.sum));
            // _count mirrors the +Inf bucket so one scrape is self-consistent.
            render::series(out, &count, names, &key, None);
            let _ = writeln!(out, " {total}");
        }
    }
}

fn validate_bounds(metric: &str, bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(LumenError::Configuration(format!(
            "{metric}: histogram needs at least one bucket"
        )));
    }
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(LumenError::Configuration(format!(
            "{metric}: bucket bounds must be finite (+Inf is implicit)"
        )));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(LumenError::Configuration(format!(
            "{metric}: bucket bounds must be strictly increasing"
        )));
    }
    Ok(())
}
