//! Lumen service library entry.
//!
//! Wires config, metric registration, request instrumentation, application
//! routes and operational endpoints into one axum `Router`. Consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod alerts;
pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod routes;
