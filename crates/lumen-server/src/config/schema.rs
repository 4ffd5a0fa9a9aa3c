use std::net::SocketAddr;

use serde::Deserialize;
use lumen_core::error::{LumenError, Result};
use lumen_core::metrics::histogram::DEFAULT_BUCKETS;

use crate::router::{RESERVED_PATHS, RESERVED_PREFIXES};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub alerts: AlertsSection,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LumenError::Configuration(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
            alerts: AlertsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// How long `/readyz` reports draining before the listener closes.
    #[serde(default = "default_drain_delay_ms")]
    pub drain_delay_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
            drain_delay_ms: default_drain_delay_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.metrics_path.starts_with('/') || self.metrics_path.len() < 2 {
            return Err(LumenError::Configuration(
                "server.metrics_path must start with '/' and name a path".into(),
            ));
        }
        if RESERVED_PATHS.contains(&self.metrics_path.as_str())
            || RESERVED_PREFIXES.iter().any(|p| self.metrics_path.starts_with(p))
        {
            return Err(LumenError::Configuration(format!(
                "server.metrics_path {:?} collides with an application route",
                self.metrics_path
            )));
        }
        if self.drain_delay_ms > 60000 {
            return Err(LumenError::Configuration(
                "server.drain_delay_ms must be between 0 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            LumenError::Configuration(format!(
                "server.listen must be a valid SocketAddr, got {:?}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_drain_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Request-duration bucket bounds, seconds.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    #[serde(default = "default_series_warn_threshold")]
    pub series_warn_threshold: usize,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            duration_buckets: default_duration_buckets(),
            series_warn_threshold: default_series_warn_threshold(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        let b = &self.duration_buckets;
        if b.is_empty() {
            return Err(LumenError::Configuration(
                "metrics.duration_buckets must not be empty".into(),
            ));
        }
        if b.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(LumenError::Configuration(
                "metrics.duration_buckets must be finite and positive".into(),
            ));
        }
        if b.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LumenError::Configuration(
                "metrics.duration_buckets must be strictly increasing".into(),
            ));
        }
        if self.series_warn_threshold == 0 {
            return Err(LumenError::Configuration(
                "metrics.series_warn_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_duration_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
fn default_series_warn_threshold() -> usize {
    1000
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AlertsSection {
    /// Rule file shipped to the collector; checked at startup when set.
    #[serde(default)]
    pub rules_file: Option<String>,

    /// Fail startup when a rule references a metric this service never exports.
    #[serde(default)]
    pub fail_on_unknown_metric: bool,
}
