// src/api/server.rs

//! HTTP server setup and routing.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::{Router, ServiceExt};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::{AppState, handlers};
use crate::error::{AppError, Result};
use crate::models::ServerConfig;

/// Route table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::redirect_root))
        .route("/healthz", get(handlers::health))
        .route("/v1", get(handlers::introspection))
        .route("/v1/semesters/:semester", get(handlers::get_semester))
        .route(
            "/v1/courses",
            get(handlers::list_courses).patch(handlers::refresh_courses),
        )
        .route("/v1/courses/:course", get(handlers::get_course))
        .with_state(state)
}

/// Router with trailing slashes stripped before routing.
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Serve the API until interrupted.
///
/// After a shutdown signal, in-flight requests get `shutdown_timeout_secs`
/// to finish before the server is dropped.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| AppError::config(format!("invalid server.addr '{}': {e}", config.addr)))?;
    let listener = TcpListener::bind(addr).await?;
    log::info!("Starting HTTP server on {addr}");

    let stop = Arc::new(Notify::new());
    let server = axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(app(state)),
    )
    .with_graceful_shutdown({
        let stop = Arc::clone(&stop);
        async move { stop.notified().await }
    })
    .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown_signal() => {
            stop.notify_one();
            let grace = Duration::from_secs(config.shutdown_timeout_secs);
            match tokio::time::timeout(grace, server).await {
                Ok(result) => result?,
                Err(_) => log::warn!(
                    "Requests still in flight after {}s; shutting down anyway",
                    grace.as_secs()
                ),
            }
        }
    }

    log::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("Received Ctrl+C, shutting down"),
        _ = terminate => log::info!("Received terminate signal, shutting down"),
    }
}
