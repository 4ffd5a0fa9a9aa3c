//! Per-request HTTP metrics.

use std::time::Instant;

use axum::http::StatusCode;
use lumen_core::error::Result;
use lumen_core::{Counter, Gauge, Histogram, LabelSet, Registry};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const RESPONSES_TOTAL: &str = "http_responses_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const REQUESTS_IN_FLIGHT: &str = "http_requests_in_flight";

/// `route` is the matched route template, never the raw path.
#[derive(Debug, Clone, Copy)]
pub struct RouteLabels<'a> {
    pub route: &'a str,
    pub method: &'a str,
}

impl LabelSet for RouteLabels<'_> {
    const NAMES: &'static [&'static str] = &["route", "method"];

    fn values(&self) -> Vec<&str> {
        vec![self.route, self.method]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OutcomeLabels<'a> {
    pub route: &'a str,
    pub method: &'a str,
    pub status: StatusClass,
}

impl LabelSet for OutcomeLabels<'_> {
    const NAMES: &'static [&'static str] = &["route", "method", "status"];

    fn values(&self) -> Vec<&str> {
        vec![self.route, self.method, self.status.as_str()]
    }
}

/// Response status class used as the `status` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
}

impl StatusClass {
    pub fn from_code(code: u16) -> Self {
        match code {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Informational => "1xx",
            StatusClass::Success => "2xx",
            StatusClass::Redirection => "3xx",
            StatusClass::ClientError => "4xx",
            StatusClass::ServerError => "5xx",
        }
    }
}

impl From<StatusCode> for StatusClass {
    fn from(s: StatusCode) -> Self {
        StatusClass::from_code(s.as_u16())
    }
}

#[derive(Clone)]
pub struct HttpMetrics {
    requests: Counter,
    responses: Counter,
    duration: Histogram,
    in_flight: Gauge,
}

impl HttpMetrics {
    pub fn register(registry: &Registry, buckets: &[f64]) -> Result<Self> {
        Ok(Self {
            requests: registry.counter(
                REQUESTS_TOTAL,
                "HTTP requests received, counted before dispatch.",
                RouteLabels::NAMES,
            )?,
            responses: registry.counter(
                RESPONSES_TOTAL,
                "HTTP responses by status class, including handler failures.",
                OutcomeLabels::NAMES,
            )?,
            duration: registry.histogram_with_buckets(
                REQUEST_DURATION,
                "HTTP request handling time in seconds.",
                RouteLabels::NAMES,
                buckets,
            )?,
            in_flight: registry.gauge(
                REQUESTS_IN_FLIGHT,
                "HTTP requests currently being handled.",
                RouteLabels::NAMES,
            )?,
        })
    }

    /// Count the request and start its timer. Call before dispatch.
    pub fn begin(&self, route: &str, method: &str) -> RequestTimer {
        let labels = RouteLabels { route, method };
        if let Err(e) = self.requests.inc_labels(&labels, 1) {
            tracing::warn!(error = %e, "request counter update failed");
        }
        if let Err(e) = self.in_flight.add_labels(&labels, 1) {
            tracing::warn!(error = %e, "in-flight gauge update failed");
        }
        RequestTimer {
            metrics: self.clone(),
            route: route.to_string(),
            method: method.to_string(),
            start: Instant::now(),
            done: false,
        }
    }
}

/// Scoped request timer.
///
/// `finish` records the outcome. If the timer is dropped without `finish`
/// (handler panicked, or its task was cancelled) it records a 5xx on `Drop`,
/// matching the generic 500 the middleware sends back, so
/// every request that was counted also lands in the histogram and in
/// `http_responses_total`.
pub struct RequestTimer {
    metrics: HttpMetrics,
    route: String,
    method: String,
    start: Instant,
    done: bool,
}

impl RequestTimer {
    pub fn finish(mut self, status: StatusCode) {
        self.record(StatusClass::from(status));
    }

    fn record(&mut self, status: StatusClass) {
        if self.done {
            return;
        }
        self.done = true;

        let m = &self.metrics;
        let labels = RouteLabels {
            route: &self.route,
            method: &self.method,
        };
        let outcome = OutcomeLabels {
            route: &self.route,
            method: &self.method,
            status,
        };
        let elapsed = self.start.elapsed().as_secs_f64();

        let results = [
            m.duration.observe_labels(&labels, elapsed),
            m.responses.inc_labels(&outcome, 1),
            m.in_flight.add_labels(&labels, -1),
        ];
        for e in results.into_iter().filter_map(|r| r.err()) {
            tracing::warn!(route = %self.route, error = %e, "request metric update failed");
        }

        if status == StatusClass::ServerError {
            tracing::warn!(route = %self.route, method = %self.method, elapsed, "request failed");
        } else {
            tracing::debug!(route = %self.route, method = %self.method, status = status.as_str(), elapsed, "request done");
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        // The handler task panicked or was cancelled; either way the
        // middleware answers 500, so the outcome is recorded as 5xx.
        self.record(StatusClass::ServerError);
    }
}
