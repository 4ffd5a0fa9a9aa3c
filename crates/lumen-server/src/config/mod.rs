//! Service config loader (strict parsing).

pub mod schema;

use std::fs;

use lumen_core::error::{LumenError, Result};

pub use schema::{AlertsSection, MetricsSection, ServerSection, ServiceConfig};

/// Env var naming the config file; defaults to `lumen.yaml`.
pub const CONFIG_ENV: &str = "LUMEN_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "lumen.yaml";

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LumenError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| LumenError::Configuration(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Path from `LUMEN_CONFIG`, or the default.
pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
