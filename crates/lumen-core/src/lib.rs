//! Lumen core: metric registry, exposition format, and the shared error type.
//!
//! This crate holds everything the service needs to count, time and report
//! requests, without any HTTP or runtime dependency, so registries can be
//! built and inspected in plain unit tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Metric calls sit in the request path; a bad label or delta must surface as
//! `LumenError::Validation`, never bring the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod metrics;

/// Shared result type.
pub use error::{LumenError, Result};
pub use metrics::{
    Counter, Gauge, Histogram, HistogramSnapshot, LabelSet, MetricHandle, MetricKind, Registry,
    RegistryOptions,
};
