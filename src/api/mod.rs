//! HTTP server module
//!
//! Three retrieval-style routes, parameters in the query string. Bodies are
//! always sent as `text/plain`, JSON-shaped on success and a single line of
//! text on failure.

use crate::{Config, Result};
use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod routes;
pub mod state;

pub use state::AppState;

/// Content type of every response
pub const PLAIN_TEXT: &str = "text/plain";

/// 200 response with a plain-text content type
pub(crate) fn plain_text(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, PLAIN_TEXT)], body).into_response()
}

/// Create the router with all route definitions
///
/// # Routes
///
/// - `GET /process?url=&version=&proxy_url=` - Sanitized metadata for one item
/// - `GET /process_playlist?url=` - Flat playlist enumeration
/// - `GET /download?url=&proxy_url=` - Download, combined first then split
///
/// Any other path fails with `no matching path: <path>`.
pub fn create_router(state: AppState) -> Router {
    use crate::types::RouteKind;

    Router::new()
        .route(RouteKind::Metadata.path(), get(routes::process))
        .route(RouteKind::PlaylistMetadata.path(), get(routes::process_playlist))
        .route(RouteKind::Download.path(), get(routes::download))
        .fallback(routes::no_matching_path)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server on the configured bind address
///
/// Runs until `shutdown` resolves, then stops accepting connections and
/// waits for in-flight requests.
///
/// # Example
///
/// ```no_run
/// use ytdl_gateway::api::{AppState, start_api_server};
/// use ytdl_gateway::{Config, engine::select_engine};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let engine = select_engine(&config.engine);
/// let state = AppState::build(engine, config.clone()).await?;
///
/// start_api_server(state, config.server.bind_address, ytdl_gateway::wait_for_signal()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(state: AppState, bind_address: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(state);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Build state for `config` and serve until a termination signal
pub async fn serve(config: Config) -> Result<()> {
    let config = std::sync::Arc::new(config);
    let engine = crate::engine::select_engine(&config.engine);
    let state = AppState::build(engine, config.clone()).await?;

    start_api_server(state, config.server.bind_address, crate::wait_for_signal()).await
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
