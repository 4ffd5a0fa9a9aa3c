use std::fmt::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::error::{LumenError, Result};
use crate::exposition::render;

use super::{Desc, LabelSet, SeriesMap};

/// Gauge family: signed value that moves both ways.
#[derive(Clone)]
pub struct Gauge {
    inner: Arc<SeriesMap<AtomicI64>>,
}

impl Gauge {
    pub(crate) fn new(desc: Desc, warn_threshold: usize) -> Self {
        Self {
            inner: Arc::new(SeriesMap::new(desc, warn_threshold)),
        }
    }

    pub fn desc(&self) -> &Desc {
        self.inner.desc()
    }

    pub fn set(&self, values: &[&str], v: i64) -> Result<()> {
        self.inner.with(values, || AtomicI64::new(0), |g| {
            g.store(v, Ordering::Relaxed);
        })
    }

    /// Add an arbitrary signed delta. A delta that would overflow `i64` is
    /// rejected and leaves the value unchanged.
    pub fn add(&self, values: &[&str], delta: i64) -> Result<()> {
        let added = self.inner.with(values, || AtomicI64::new(0), |g| {
            g.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| cur.checked_add(delta))
                .is_ok()
        })?;
        if !added {
            return Err(LumenError::Validation(format!(
                "{}: gauge add {delta} would overflow",
                self.desc().name()
            )));
        }
        Ok(())
    }

    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.add(values, 1)
    }

    pub fn dec(&self, values: &[&str]) -> Result<()> {
        self.add(values, -1)
    }

    pub fn add_labels<L: LabelSet>(&self, labels: &L, delta: i64) -> Result<()> {
        let values = self.desc().schema().check(self.desc().name(), labels)?;
        self.add(&values, delta)
    }

    /// Current value; 0 for a series never touched.
    pub fn get(&self, values: &[&str]) -> Result<i64> {
        Ok(self
            .inner
            .read(values, |g| g.load(Ordering::Relaxed))?
            .unwrap_or(0))
    }

    pub(crate) fn touch(&self) -> Result<()> {
        self.add(&[], 0)
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn render(&self, out: &mut String) {
        let desc = self.desc();
        render::header(out, desc.name(), desc.help(), "gauge");
        for (key, val) in self.inner.collect(|g| g.load(Ordering::Relaxed)) {
            render::series(out, desc.name(), desc.schema().names(), &key, None);
            let _ = writeln!(out, " {val}");
        }
    }
}
