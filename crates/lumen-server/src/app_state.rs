//! Shared application state for the Lumen service.
//!
//! Owns the metric registry. There is no global registry: tests build one
//! `AppState` per case and get an isolated set of metrics.

use std::sync::Arc;

use lumen_core::error::Result;
use lumen_core::{Registry, RegistryOptions};

use crate::alerts::{self, CompiledRule};
use crate::config::ServiceConfig;
use crate::obs::{HttpMetrics, ServiceMetrics};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    registry: Arc<Registry>,
    http: HttpMetrics,
    service: ServiceMetrics,
    rules: Vec<CompiledRule>,
}

impl AppState {
    /// Build application state and register every metric family.
    /// Returns Result so main can fail startup cleanly on a schema conflict.
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        let registry = Arc::new(Registry::new(RegistryOptions {
            default_buckets: cfg.metrics.duration_buckets.clone(),
            series_warn_threshold: cfg.metrics.series_warn_threshold,
        }));
        Self::with_registry(cfg, registry)
    }

    /// Build state around an existing registry (shared with other components).
    pub fn with_registry(cfg: ServiceConfig, registry: Arc<Registry>) -> Result<Self> {
        // 1) Register metric families
        let http = HttpMetrics::register(&registry, &cfg.metrics.duration_buckets)?;
        let service = ServiceMetrics::register(&registry)?;

        // 2) Load and check alert rules against what this service exports
        let rules = match &cfg.alerts.rules_file {
            Some(path) => {
                let rules = alerts::load_from_file(path)?;
                alerts::check_metric_refs(&rules, &registry, cfg.alerts.fail_on_unknown_metric)?;
                tracing::info!(path = %path, rules = rules.len(), "alert rules loaded");
                rules
            }
            None => Vec::new(),
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                http,
                service,
                rules,
            }),
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.inner.http
    }

    pub fn service_metrics(&self) -> &ServiceMetrics {
        &self.inner.service
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.inner.rules
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        if let Err(e) = self.inner.service.set_draining() {
            tracing::warn!(error = %e, "failed to set draining gauge");
        }
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.inner.service.is_draining()
    }
}
