use axum::extract::State;

use crate::app_state::AppState;
use crate::error::ApiError;

/// Counts the attempt and acknowledges it. No credentials are checked.
pub async fn login(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.service_metrics().record_login()?;
    tracing::info!("login attempt");
    Ok("login acknowledged")
}
