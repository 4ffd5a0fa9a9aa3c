//! Request instrumentation middleware.
//!
//! Installed with `Router::route_layer`, so it only sees requests that
//! matched a route and always has a `MatchedPath`. The metrics endpoint is
//! added after the layer and is therefore never counted.
//!
//! The handler runs in its own task: a client that disconnects drops this
//! middleware's future, but the handler still completes and its timer still
//! records. A handler task that panics or is cancelled drops its timer
//! unfinished (`RequestTimer::drop` records a 5xx) and surfaces here as a
//! `JoinError`, answered with the same generic 500.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::error::ApiError;

pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let method = req.method().as_str().to_owned();

    let timer = state.http_metrics().begin(&route, &method);
    let handler = tokio::spawn(async move {
        let resp = next.run(req).await;
        timer.finish(resp.status());
        resp
    });

    match handler.await {
        Ok(resp) => resp,
        Err(e) => {
            if e.is_panic() {
                tracing::error!(%route, %method, "handler panicked");
            } else {
                tracing::error!(%route, %method, error = %e, "handler task aborted");
            }
            ApiError::HandlerAborted.into_response()
        }
    }
}
