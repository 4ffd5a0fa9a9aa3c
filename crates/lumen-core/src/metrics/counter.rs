use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{LumenError, Result};
use crate::exposition::render;

use super::{Desc, LabelSet, SeriesMap};

/// Monotonic counter family. Clones share the same series.
#[derive(Clone)]
pub struct Counter {
    inner: Arc<SeriesMap<AtomicU64>>,
}

impl Counter {
    pub(crate) fn new(desc: Desc, warn_threshold: usize) -> Self {
        Self {
            inner: Arc::new(SeriesMap::new(desc, warn_threshold)),
        }
    }

    pub fn desc(&self) -> &Desc {
        self.inner.desc()
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.inc_by(values, 1)
    }

    /// Increment by `delta`. Negative deltas, and deltas that would overflow
    /// the series, are rejected and leave the value unchanged.
    pub fn inc_by(&self, values: &[&str], delta: i64) -> Result<()> {
        if delta < 0 {
            return Err(LumenError::Validation(format!(
                "{}: counter delta must be non-negative, got {delta}",
                self.desc().name()
            )));
        }
        let delta = delta as u64;
        let added = self.inner.with(values, || AtomicU64::new(0), |c| {
            c.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| cur.checked_add(delta))
                .is_ok()
        })?;
        if !added {
            return Err(LumenError::Validation(format!(
                "{}: counter increment by {delta} would overflow",
                self.desc().name()
            )));
        }
        Ok(())
    }

    /// Increment using a typed label set.
    pub fn inc_labels<L: LabelSet>(&self, labels: &L, delta: i64) -> Result<()> {
        let values = self.desc().schema().check(self.desc().name(), labels)?;
        self.inc_by(&values, delta)
    }

    /// Current value; 0 for a series never touched.
    pub fn get(&self, values: &[&str]) -> Result<u64> {
        Ok(self
            .inner
            .read(values, |c| c.load(Ordering::Relaxed))?
            .unwrap_or(0))
    }

    /// Create the label-less series up front so it renders before first use.
    pub(crate) fn touch(&self) -> Result<()> {
        self.inc_by(&[], 0)
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Render in Prometheus text exposition format.
    pub(crate) fn render(&self, out: &mut String) {
        let desc = self.desc();
        render::header(out, desc.name(), desc.help(), "counter");
        for (key, val) in self.inner.collect(|c| c.load(Ordering::Relaxed)) {
            render::series(out, desc.name(), desc.schema().names(), &key, None);
            let _ = writeln!(out, " {val}");
        }
    }
}
