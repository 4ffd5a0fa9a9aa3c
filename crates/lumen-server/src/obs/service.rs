use std::time::{SystemTime, UNIX_EPOCH};

use lumen_core::error::Result;
use lumen_core::{Counter, Gauge, Registry};

pub const LOGIN_ATTEMPTS: &str = "lumen_login_attempts_total";
pub const DRAINING: &str = "lumen_draining";
pub const BUILD_INFO: &str = "lumen_build_info";
pub const PROCESS_START: &str = "process_start_time_seconds";

/// Application-level metrics outside the request wrapper.
#[derive(Clone)]
pub struct ServiceMetrics {
    login_attempts: Counter,
    draining: Gauge,
}

impl ServiceMetrics {
    pub fn register(registry: &Registry) -> Result<Self> {
        let login_attempts =
            registry.counter(LOGIN_ATTEMPTS, "Login attempts received.", &[])?;
        let draining = registry.gauge(DRAINING, "1 while the service is shutting down.", &[])?;

        let build = registry.gauge(BUILD_INFO, "Build information; value is always 1.", &["version"])?;
        build.set(&[env!("CARGO_PKG_VERSION")], 1)?;

        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        registry
            .gauge(PROCESS_START, "Start time of the process since unix epoch in seconds.", &[])?
            .set(&[], started as i64)?;

        Ok(Self {
            login_attempts,
            draining,
        })
    }

    pub fn record_login(&self) -> Result<()> {
        self.login_attempts.inc(&[])
    }

    pub fn login_attempts(&self) -> u64 {
        self.login_attempts.get(&[]).unwrap_or(0)
    }

    pub fn set_draining(&self) -> Result<()> {
        self.draining.set(&[], 1)
    }

    pub fn is_draining(&self) -> bool {
        self.draining.get(&[]).map(|v| v == 1).unwrap_or(false)
    }
}
