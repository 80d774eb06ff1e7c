//! HTTP module for Memoirs
//!
//! Serves the memoir page. Every user action is a form post that updates the
//! page session and redirects back to the page.

pub mod routes;

use crate::client::MemoirApi;
use crate::error::{AppError, Result};
use crate::session::SessionStore;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Remote memoir API
    pub api: Arc<dyn MemoirApi>,
    /// Page sessions, one per page load
    pub sessions: Arc<SessionStore>,
}

/// Start the HTTP server and block until shutdown
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = create_router(state);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/:id", get(routes::show_page))
        .route(
            "/:id/records",
            get(routes::list_records).post(routes::submit_record),
        )
        .route("/:id/panel/open", post(routes::open_panel))
        .route("/:id/panel/close", post(routes::close_panel));

    Router::new()
        .route("/", get(routes::load_page))
        .route("/health", get(routes::health))
        .nest("/pages", page_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
