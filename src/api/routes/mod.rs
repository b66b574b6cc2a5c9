//! Route handlers for the HTTP surface
//!
//! Handlers are organized by flow:
//! - [`metadata`]: `/process` and `/process_playlist`
//! - [`download`]: `/download`
//!
//! Parameters arrive in the query string. Every handler builds a fresh
//! [`EscalatingLogger`](crate::bridge::EscalatingLogger) so escalation state
//! never outlives the request.

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::{ExtractionRequest, RouteKind, VersionToken};
use axum::http::Uri;

mod download;
mod metadata;

pub use download::*;
pub use metadata::*;

// ============================================================================
// Query parameters (shared across handlers)
// ============================================================================

/// Query parameters recognized by the extraction routes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Target media URL
    pub url: Option<String>,
    /// Protocol version token
    pub version: Option<String>,
    /// Upstream proxy
    pub proxy_url: Option<String>,
}

impl QueryParams {
    /// Decode a raw query string
    ///
    /// Blank values count as absent, and for repeated keys the first
    /// non-blank value wins.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(raw) = raw else {
            return params;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "url" => &mut params.url,
                "version" => &mut params.version,
                "proxy_url" => &mut params.proxy_url,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }
}

/// Turn query parameters into a validated request for `route`
pub(crate) fn build_request(
    state: &AppState,
    route: RouteKind,
    raw_query: Option<&str>,
) -> Result<ExtractionRequest> {
    let params = QueryParams::parse(raw_query);

    let url = params
        .url
        .as_deref()
        .ok_or_else(|| Error::config("url", "missing required parameter: url"))?;

    // Only the metadata route is version-dependent
    let version = match params.version.as_deref() {
        Some(raw) if route == RouteKind::Metadata => VersionToken::parse(raw)?,
        _ => VersionToken::from_number(state.config.policy.default_version)?,
    };

    ExtractionRequest::new(route, url, params.proxy_url.as_deref(), version)
}

/// Fallback for paths that match no route
///
/// Fails without touching the engine.
pub async fn no_matching_path(uri: Uri) -> Error {
    match RouteKind::from_path(uri.path()) {
        Err(e) => e,
        Ok(route) => Error::NotSupported(format!("unsupported method for {}", route.path())),
    }
}
