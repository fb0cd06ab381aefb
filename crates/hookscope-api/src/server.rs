//! HTTP server configuration and request routing.
//!
//! Axum server setup with the middleware stack and graceful shutdown.
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. CORS handling (permissive; the UI may be served from elsewhere)
//! 4. Timeout enforcement
//! 5. Handler execution
//!
//! # Graceful Shutdown
//!
//! The server handles SIGINT/SIGTERM gracefully: it stops accepting new
//! connections and waits for in-flight requests before returning.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{any, get, post},
    Router,
};
use hookscope_core::{storage::Storage, Clock};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::{handlers, ui};

/// Shared application state, injected into every handler.
///
/// Constructed once at startup; no other cross-request mutable state
/// exists server-side.
#[derive(Clone)]
pub struct AppState {
    /// Storage layer providing repository access.
    pub storage: Arc<Storage>,
    /// Clock used for capture timestamps and health reporting.
    pub clock: Arc<dyn Clock>,
    /// Fixed page length for the listing endpoint.
    pub page_size: i64,
    /// Maximum accepted capture body size in bytes.
    pub max_capture_bytes: usize,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

/// Creates the axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use hookscope_api::{create_router, AppState};
///
/// fn build(state: AppState) {
///     let app = create_router(state);
///     // Serve the app...
/// }
/// ```
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check));

    let api_routes = Router::new()
        .route("/api/webhooks", get(handlers::list_webhooks))
        .route(
            "/api/webhooks/{id}",
            get(handlers::get_webhook).delete(handlers::delete_webhook),
        )
        .route("/api/generate", post(handlers::generate_code));

    // The capture handler enforces the configured payload cap itself so
    // oversized requests get the coded error envelope; the framework-level
    // limit would answer first with a bare 413.
    let capture_routes = Router::new()
        .route("/capture", any(handlers::capture_webhook))
        .route("/capture/{*path}", any(handlers::capture_webhook))
        .layer(DefaultBodyLimit::disable());

    let request_timeout = state.request_timeout;

    Router::new()
        .route("/", get(ui::index))
        .merge(health_routes)
        .merge(api_routes)
        .merge(capture_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject a request ID into all responses.
///
/// Adds an X-Request-Id header for tracing requests across services.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds to the specified address and serves requests until a shutdown
/// signal is received. Connections are served with peer address
/// information so the capture endpoint can record source IPs.
///
/// # Errors
///
/// Returns `std::io::Error` if the port is already in use or the network
/// interface is unavailable.
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
