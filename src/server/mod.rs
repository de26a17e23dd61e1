//! Prediction service
//!
//! HTTP front end over a loaded [`InferenceEngine`](crate::inference::InferenceEngine):
//! `POST /predict`, `GET /model` and `GET /health`.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::PredictResponse;
pub use state::AppState;

use crate::inference::InferenceEngine;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            models_dir: std::env::var("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(crate::training::DEFAULT_MODELS_DIR)),
        }
    }
}

/// Load the artifacts and serve until ctrl+c.
///
/// Artifacts are loaded before the socket is bound; a missing or inconsistent
/// artifact aborts startup.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    info!(models_dir = %config.models_dir.display(), "Loading artifacts");
    let engine = InferenceEngine::load(&config.models_dir).map_err(|e| {
        error!(models_dir = %config.models_dir.display(), error = %e, "Failed to load artifacts");
        e
    })?;

    let state = Arc::new(AppState::new(engine));
    let start_time = state.started_at;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        pid = std::process::id(),
        started_at = %start_time.to_rfc3339(),
        "Burnout prediction service listening"
    );

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_server_fails_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            models_dir: dir.path().join("missing"),
        };
        assert!(run_server(config).await.is_err());
    }
}
