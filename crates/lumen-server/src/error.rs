//! HTTP error conversion.
//!
//! Every handler failure becomes the same generic 500 body; the detail goes
//! to the log only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lumen_core::error::ClientCode;
use lumen_core::LumenError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Lumen(#[from] LumenError),
    /// Handler task panicked or was cancelled before responding.
    #[error("handler did not complete")]
    HandlerAborted,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Lumen(e) = &self {
            tracing::error!(code = e.client_code().as_str(), error = %e, "request failed");
        }
        generic_500()
    }
}

fn generic_500() -> Response {
    let body = json!({
        "error": {
            "code": ClientCode::Internal.as_str(),
            "message": "internal server error"
        }
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
