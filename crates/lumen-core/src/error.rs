//! Shared error type across Lumen crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Metric schema conflict, bad config or rule file.
    Configuration,
    /// Bad arguments to a metric call.
    Validation,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Configuration => "CONFIGURATION",
            ClientCode::Validation => "VALIDATION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LumenError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum LumenError {
    /// Detected at registration or startup. Fatal.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Bad metric mutation arguments. Registry state is left untouched.
    #[error("validation error: {0}")]
    Validation(String),
    /// Failure inside a request handler.
    #[error("application error: {0}")]
    Application(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl LumenError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            LumenError::Configuration(_) => ClientCode::Configuration,
            LumenError::Validation(_) => ClientCode::Validation,
            LumenError::Application(_) | LumenError::Internal(_) => ClientCode::Internal,
        }
    }
}
