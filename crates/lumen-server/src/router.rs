//! Axum router wiring.
//!
//! Order matters: `route_layer` wraps only the routes declared before it.
//! The metrics route is added afterwards so scrapes never count themselves.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, obs, ops, routes};

/// Paths owned by application and ops routes; the metrics path may not reuse them.
pub const RESERVED_PATHS: &[&str] = &[
    "/", "/login", "/error", "/simulate500", "/healthz", "/readyz", "/rules",
];
pub const RESERVED_PREFIXES: &[&str] = &["/hello/"];

pub fn build_router(state: AppState) -> Router {
    let metrics_path = state.cfg().server.metrics_path.clone();

    Router::new()
        .route("/", get(routes::home::index))
        .route("/hello/:name", get(routes::home::hello))
        .route("/login", post(routes::auth::login))
        .route("/error", get(routes::faults::error))
        .route("/simulate500", get(routes::faults::simulate_500))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/rules", get(ops::rules))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            obs::track_requests,
        ))
        .route(&metrics_path, get(ops::metrics))
        .with_state(state)
}
