//! Download handler.

use super::build_request;
use crate::api::{AppState, plain_text};
use crate::bridge::{EscalatingLogger, run_guarded};
use crate::error::Result;
use crate::types::{DownloadResponse, RouteKind};
use axum::{
    extract::{RawQuery, State},
    response::Response,
};
use std::path::{Path, PathBuf};

/// Prefix of per-request work directories
const WORK_DIR_PREFIX: &str = "download-";

/// GET /download - Materialize files, combined first, split as fallback
///
/// Query: `url` (required), `proxy_url` (optional). Responds with
/// `{"video": path}` or `{"video": path, "audio": path}`.
pub async fn download(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let request = build_request(&state, RouteKind::Download, query.as_deref())?;
    let policy = state
        .selector
        .select(request.route, request.version, request.proxy.as_deref())?;
    let work_dir = create_work_dir(&state.config.download.work_dir).await?;

    tracing::info!(
        url = %request.url,
        work_dir = %work_dir.display(),
        "starting download"
    );

    let logger = EscalatingLogger::new(state.config.policy.rate_limit_escalation);
    let outcome = run_guarded(&logger, async {
        Ok(state
            .orchestrator
            .download(
                &request,
                &policy,
                state.eligibility.clone(),
                &work_dir,
                &logger,
            )
            .await)
    })
    .await?;

    let media = outcome.into_result()?;
    let body = serde_json::to_string(&DownloadResponse::from(&media))?;
    Ok(plain_text(body))
}

/// Create a fresh, kept directory `<base>/download-XXXXXX` with an absolute path
///
/// Never reused across requests and never deleted here.
pub(crate) async fn create_work_dir(base: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(base).await?;
    let base = std::path::absolute(base)?;

    let dir = tempfile::Builder::new()
        .prefix(WORK_DIR_PREFIX)
        .tempdir_in(&base)?
        .keep();

    Ok(dir)
}
