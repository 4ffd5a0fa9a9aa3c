//! Process-wide metric registry.
//!
//! The family table is an `RwLock<BTreeMap>` taken for writing only while
//! registering. Handles returned from it mutate their own series directly, so
//! request-path updates never touch the table lock. The map is ordered so
//! snapshots come out in a stable order.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{LumenError, Result};

use super::histogram::DEFAULT_BUCKETS;
use super::labels::is_valid_metric_name;
use super::{Counter, Desc, Gauge, Histogram, LabelSchema, MetricKind};

/// Registry-wide defaults.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Bounds used by `histogram` and `get_or_create(Histogram, ..)`.
    pub default_buckets: Vec<f64>,
    /// Series count per family at which a one-time warning is logged.
    pub series_warn_threshold: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            default_buckets: DEFAULT_BUCKETS.to_vec(),
            series_warn_threshold: 1000,
        }
    }
}

/// Handle to a registered family. Clones share state.
#[derive(Clone)]
pub enum MetricHandle {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl MetricHandle {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricHandle::Counter(_) => MetricKind::Counter,
            MetricHandle::Gauge(_) => MetricKind::Gauge,
            MetricHandle::Histogram(_) => MetricKind::Histogram,
        }
    }

    pub fn desc(&self) -> &Desc {
        match self {
            MetricHandle::Counter(c) => c.desc(),
            MetricHandle::Gauge(g) => g.desc(),
            MetricHandle::Histogram(h) => h.desc(),
        }
    }

    pub fn as_counter(&self) -> Option<&Counter> {
        match self {
            MetricHandle::Counter(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_gauge(&self) -> Option<&Gauge> {
        match self {
            MetricHandle::Gauge(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&Histogram> {
        match self {
            MetricHandle::Histogram(h) => Some(h),
            _ => None,
        }
    }

    /// Whether both handles point at the same family instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MetricHandle::Counter(a), MetricHandle::Counter(b)) => a.ptr_eq(b),
            (MetricHandle::Gauge(a), MetricHandle::Gauge(b)) => a.ptr_eq(b),
            (MetricHandle::Histogram(a), MetricHandle::Histogram(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Sample names this family emits.
    pub fn series_names(&self) -> Vec<String> {
        series_names(self.kind(), self.desc().name())
    }

    fn render(&self, out: &mut String) {
        match self {
            MetricHandle::Counter(c) => c.render(out),
            MetricHandle::Gauge(g) => g.render(out),
            MetricHandle::Histogram(h) => h.render(out),
        }
    }
}

fn series_names(kind: MetricKind, name: &str) -> Vec<String> {
    match kind {
        MetricKind::Histogram => vec![
            name.to_string(),
            format!("{name}_bucket"),
            format!("{name}_sum"),
            format!("{name}_count"),
        ],
        _ => vec![name.to_string()],
    }
}

/// Get-or-create access to named metric families.
pub struct Registry {
    families: RwLock<BTreeMap<String, MetricHandle>>,
    opts: RegistryOptions,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryOptions::default())
    }
}

impl Registry {
    pub fn new(opts: RegistryOptions) -> Self {
        Self {
            families: RwLock::new(BTreeMap::new()),
            opts,
        }
    }

    /// Get or create a family. Histograms use the default buckets.
    ///
    /// Same name with a different kind or label schema is a
    /// `Configuration` error; name+kind+schema is fixed for the process
    /// lifetime.
    pub fn get_or_create(
        &self,
        kind: MetricKind,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<MetricHandle> {
        let buckets = self.opts.default_buckets.clone();
        self.register(kind, name, help, label_names, &buckets)
    }

    pub fn counter(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Counter> {
        match self.get_or_create(MetricKind::Counter, name, help, label_names)? {
            MetricHandle::Counter(c) => Ok(c),
            other => Err(kind_mismatch(name, other.kind(), MetricKind::Counter)),
        }
    }

    pub fn gauge(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Gauge> {
        match self.get_or_create(MetricKind::Gauge, name, help, label_names)? {
            MetricHandle::Gauge(g) => Ok(g),
            other => Err(kind_mismatch(name, other.kind(), MetricKind::Gauge)),
        }
    }

    pub fn histogram(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Histogram> {
        let buckets = self.opts.default_buckets.clone();
        self.histogram_with_buckets(name, help, label_names, &buckets)
    }

    pub fn histogram_with_buckets(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        buckets: &[f64],
    ) -> Result<Histogram> {
        match self.register(MetricKind::Histogram, name, help, label_names, buckets)? {
            MetricHandle::Histogram(h) => Ok(h),
            other => Err(kind_mismatch(name, other.kind(), MetricKind::Histogram)),
        }
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.read_families().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every sample name the registry can emit, sorted.
    pub fn series_names(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .read_families()
            .values()
            .flat_map(MetricHandle::series_names)
            .collect();
        out.sort();
        out
    }

    /// Render all families in the text exposition format.
    ///
    /// Each series is read atomically; the snapshot as a whole is not a
    /// single instant.
    pub fn snapshot(&self) -> String {
        let handles: Vec<MetricHandle> = self.read_families().values().cloned().collect();
        let mut out = String::new();
        for h in &handles {
            h.render(&mut out);
        }
        out
    }

    fn read_families(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, MetricHandle>> {
        // Poison means a panic mid-registration; the map itself is still whole.
        self.families.read().unwrap_or_else(|e| e.into_inner())
    }

    fn register(
        &self,
        kind: MetricKind,
        name: &str,
        help: &str,
        label_names: &[&str],
        buckets: &[f64],
    ) -> Result<MetricHandle> {
        if !is_valid_metric_name(name) {
            return Err(LumenError::Configuration(format!("invalid metric name: {name:?}")));
        }
        let schema = LabelSchema::new(label_names)?;

        if let Some(existing) = self.read_families().get(name) {
            return check_compatible(existing, kind, &schema, buckets);
        }

        let mut families = self
            .families
            .write()
            .map_err(|_| LumenError::Internal("metric registry lock poisoned".into()))?;

        // Lost a registration race: the winner's family is authoritative.
        if let Some(existing) = families.get(name) {
            return check_compatible(existing, kind, &schema, buckets);
        }

        for new_name in series_names(kind, name) {
            if let Some(owner) = families
                .values()
                .find(|h| h.series_names().contains(&new_name))
            {
                return Err(LumenError::Configuration(format!(
                    "{name}: sample name {new_name:?} collides with {} {:?}",
                    owner.kind().as_str(),
                    owner.desc().name()
                )));
            }
        }

        let desc = Desc::new(name, help, schema);
        let warn = self.opts.series_warn_threshold.max(1);
        let handle = match kind {
            MetricKind::Counter => MetricHandle::Counter(Counter::new(desc, warn)),
            MetricKind::Gauge => MetricHandle::Gauge(Gauge::new(desc, warn)),
            MetricKind::Histogram => MetricHandle::Histogram(Histogram::new(desc, buckets, warn)?),
        };

        if handle.desc().schema().is_empty() {
            match &handle {
                MetricHandle::Counter(c) => c.touch()?,
                MetricHandle::Gauge(g) => g.touch()?,
                MetricHandle::Histogram(h) => h.touch()?,
            }
        }

        tracing::debug!(metric = %name, kind = kind.as_str(), "metric registered");
        families.insert(name.to_string(), handle.clone());
        Ok(handle)
    }
}

fn check_compatible(
    existing: &MetricHandle,
    kind: MetricKind,
    schema: &LabelSchema,
    buckets: &[f64],
) -> Result<MetricHandle> {
    let name = existing.desc().name();
    if existing.kind() != kind {
        return Err(kind_mismatch(name, existing.kind(), kind));
    }
    if existing.desc().schema() != schema {
        return Err(LumenError::Configuration(format!(
            "{name}: already registered with labels [{}], requested [{}]",
            existing.desc().schema().names().join(","),
            schema.names().join(",")
        )));
    }
    if let MetricHandle::Histogram(h) = existing {
        if h.bounds() != buckets {
            return Err(LumenError::Configuration(format!(
                "{name}: already registered with different bucket bounds"
            )));
        }
    }
    Ok(existing.clone())
}

fn kind_mismatch(name: &str, existing: MetricKind, requested: MetricKind) -> LumenError {
    LumenError::Configuration(format!(
        "{name}: already registered as {}, requested {}",
        existing.as_str(),
        requested.as_str()
    ))
}
