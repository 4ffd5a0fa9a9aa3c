//! Lumen demo service.
//!
//! - Application routes wrapped with request metrics
//! - Fault-injection routes (`/error`, `/simulate500`) for alert testing
//! - `/metrics` for the collector's periodic scrape
//! - Graceful drain: `/readyz` flips to 503 before the listener closes

use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use lumen_core::error::Result;
use lumen_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.client_code().as_str(), error = %e, "lumen-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, metrics_path = %state.cfg().server.metrics_path, "lumen-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| lumen_core::LumenError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| lumen_core::LumenError::Internal(format!("server failed: {e}")))?;

    tracing::info!("lumen-server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM, after flagging draining and waiting out
/// the configured delay so readiness probes see 503 first.
async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.set_draining();
    let delay = state.cfg().server.drain_delay_ms;
    tracing::info!(drain_delay_ms = delay, "shutdown requested; draining");
    tokio::time::sleep(Duration::from_millis(delay)).await;
}
