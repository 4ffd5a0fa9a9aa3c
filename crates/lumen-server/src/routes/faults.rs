//! Fault injection for alert testing. Both routes always answer 500.

use lumen_core::LumenError;

use crate::error::ApiError;

/// Fails through the normal error path (`ApiError` -> generic 500).
pub async fn error() -> Result<&'static str, ApiError> {
    Err(LumenError::Application("deliberate failure from /error".into()).into())
}

/// Fails with an unhandled panic; the instrumentation layer turns it into
/// the generic 500 after the request metrics are recorded.
pub async fn simulate_500() -> &'static str {
    panic!("simulated unhandled failure from /simulate500")
}
