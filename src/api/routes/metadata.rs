//! Metadata handlers: single item and flat playlist.

use super::build_request;
use crate::api::{AppState, plain_text};
use crate::bridge::{EscalatingLogger, run_guarded};
use crate::engine::EngineOptions;
use crate::error::Result;
use crate::types::RouteKind;
use axum::{
    extract::{RawQuery, State},
    response::Response,
};

/// GET /process - Sanitized metadata for one media item
///
/// Query: `url` (required), `version` (optional), `proxy_url` (optional).
pub async fn process(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    extract_metadata(&state, RouteKind::Metadata, query.as_deref()).await
}

/// GET /process_playlist - Flat playlist enumeration
///
/// Query: `url` (required). `proxy_url` is ignored on this route.
pub async fn process_playlist(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    extract_metadata(&state, RouteKind::PlaylistMetadata, query.as_deref()).await
}

async fn extract_metadata(
    state: &AppState,
    route: RouteKind,
    raw_query: Option<&str>,
) -> Result<Response> {
    let request = build_request(state, route, raw_query)?;
    let policy = state
        .selector
        .select(request.route, request.version, request.proxy.as_deref())?;
    let options = EngineOptions::new(policy, state.eligibility.clone());

    tracing::info!(
        url = %request.url,
        %route,
        version = %request.version,
        engine = state.engine.name(),
        "extracting metadata"
    );

    let logger = EscalatingLogger::new(state.config.policy.rate_limit_escalation);
    let info = run_guarded(
        &logger,
        state.engine.extract(&request.url, &options, &logger),
    )
    .await?;

    let body = serde_json::to_string(&state.engine.sanitize(info))?;
    Ok(plain_text(body))
}
