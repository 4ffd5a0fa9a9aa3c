//! Request instrumentation and service-level metrics.
//!
//! All families are registered once at startup from `AppState::new`; a schema
//! conflict there is a fatal configuration error. Handles are cheap clones
//! that go straight to their series atomics.

pub mod http;
pub mod service;
pub mod track;

pub use http::{HttpMetrics, RequestTimer, RouteLabels, StatusClass};
pub use service::ServiceMetrics;
pub use track::track_requests;
