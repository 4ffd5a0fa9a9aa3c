//! Metric registry: counters, gauges and histograms with label schemas.
//!
//! Every family owns a `DashMap` of series keyed by label values, and every
//! series is a set of atomics. Mutations never take a lock wider than one
//! `DashMap` shard, so unrelated metrics never contend.

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod labels;
pub mod registry;

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use crate::error::Result;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::{Histogram, HistogramSnapshot};
pub use labels::{LabelSchema, LabelSet};
pub use registry::{MetricHandle, Registry, RegistryOptions};

/// Metric family kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    /// Name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Static description of a family.
#[derive(Debug, Clone)]
pub struct Desc {
    name: String,
    help: String,
    schema: LabelSchema,
}

impl Desc {
    pub(crate) fn new(name: &str, help: &str, schema: LabelSchema) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn schema(&self) -> &LabelSchema {
        &self.schema
    }
}

/// Series storage shared by all kinds.
pub(crate) struct SeriesMap<T> {
    desc: Desc,
    cells: DashMap<Vec<String>, T>,
    warn_threshold: usize,
    warned: AtomicBool,
}

impl<T> SeriesMap<T> {
    pub(crate) fn new(desc: Desc, warn_threshold: usize) -> Self {
        Self {
            desc,
            cells: DashMap::new(),
            warn_threshold,
            warned: AtomicBool::new(false),
        }
    }

    pub(crate) fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Run `f` on the series for `values`, creating it with `init` on first use.
    pub(crate) fn with<R>(
        &self,
        values: &[&str],
        init: impl FnOnce() -> T,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R> {
        let key = self.desc.schema.key(&self.desc.name, values)?;
        if let Some(cell) = self.cells.get(&key) {
            return Ok(f(cell.value()));
        }

        let cell = self.cells.entry(key).or_insert_with(init);
        let out = f(cell.value());
        // Shard write lock must be released before len() walks all shards.
        drop(cell);
        self.check_cardinality();
        Ok(out)
    }

    /// Read an existing series without creating it.
    pub(crate) fn read<R>(&self, values: &[&str], f: impl FnOnce(&T) -> R) -> Result<Option<R>> {
        let key = self.desc.schema.key(&self.desc.name, values)?;
        Ok(self.cells.get(&key).map(|cell| f(cell.value())))
    }

    /// Snapshot every series, sorted by label values.
    pub(crate) fn collect<R>(&self, f: impl Fn(&T) -> R) -> Vec<(Vec<String>, R)> {
        let mut rows: Vec<(Vec<String>, R)> = self
            .cells
            .iter()
            .map(|r| (r.key().clone(), f(r.value())))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    fn check_cardinality(&self) {
        if self.warned.load(Ordering::Relaxed) {
            return;
        }
        let n = self.cells.len();
        if n >= self.warn_threshold && !self.warned.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                metric = %self.desc.name,
                series = n,
                threshold = self.warn_threshold,
                "metric cardinality threshold reached; check label values are bounded"
            );
        }
    }
}
