use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::{
    services::{download, health},
    state::AppState,
};
use crate::config::Config;
use crate::downloader::{Downloader, YtDlp};
use crate::workspace;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All routes with their middleware, ready to serve or to drive from tests
pub fn router(state: AppState) -> Router {
    let index = ServeFile::new(&state.config.server.index_path);

    Router::new()
        .route("/api/download", post(download))
        .route("/health", get(health))
        .route_service("/", index)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // gzip/deflate request bodies are decoded before the handler sees them
                .layer(RequestDecompressionLayer::new()),
        )
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    let root = config.workspace.root.clone();
    if config.workspace.purge_on_start {
        workspace::purge_stale(&root)
            .await
            .map_err(|e| format!("Failed to purge workspace root {}: {e}", root.display()))?;
    }
    tokio::fs::create_dir_all(&root)
        .await
        .map_err(|e| format!("Failed to create workspace root {}: {e}", root.display()))?;

    let downloader = Arc::new(YtDlp::new(&config.downloader));
    match downloader.version().await {
        Ok(version) => info!(program = downloader.name(), %version, "Downloader available"),
        Err(err) => warn!(
            program = downloader.name(),
            error = %err,
            "Downloader not usable yet, requests will fail until it is installed"
        ),
    }

    let address = config.server.bind_addr;
    let app = router(AppState::new(config, downloader));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "mediagrab listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
