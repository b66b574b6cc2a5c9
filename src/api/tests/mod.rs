use super::*;
use crate::catalog::CatalogEligibility;
use crate::test_helpers::{FakeEngine, FakeFile, FakeReply};
use axum::body::{Body, to_bytes};
use axum::extract::Request;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;


/// Router over a scripted engine, with downloads going into a temp dir
fn test_app(engine: &Arc<FakeEngine>) -> (Router, TempDir) {
    test_app_with(engine, |_| {})
}

fn test_app_with(engine: &Arc<FakeEngine>, adjust: impl FnOnce(&mut Config)) -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.download.work_dir = temp_dir.path().join("downloads");
    adjust(&mut config);

    let state = AppState::new(
        engine.clone(),
        Arc::new(config),
        Some(CatalogEligibility::allow_all()),
    );
    (create_router(state), temp_dir)
}

/// Send a GET and return status, content type and body
async fn get(app: Router, uri: &str) -> (StatusCode, String, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let content_length = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .map(|v| v.to_str().unwrap().parse::<usize>().unwrap());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if let Some(length) = content_length {
        assert_eq!(length, bytes.len(), "Content-Length must match the body");
    }

    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_unknown_path_fails_without_engine() {
    let engine = Arc::new(FakeEngine::default());
    let (app, _dir) = test_app(&engine);

    let (status, content_type, body) = get(app, "/unknown?url=https://example.com/v").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type, "text/plain");
    assert!(body.contains("no matching path: /unknown"), "{body}");
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_missing_url_is_500_without_engine() {
    for path in ["/process", "/process_playlist", "/download"] {
        let engine = Arc::new(FakeEngine::default());
        let (app, _dir) = test_app(&engine);

        let (status, _, body) = get(app, path).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert!(body.contains("url"), "{path}: {body}");
        assert!(!body.contains('\n'));
        assert!(engine.calls().is_empty());
    }
}

#[tokio::test]
async fn test_unparseable_url_is_500() {
    let engine = Arc::new(FakeEngine::default());
    let (app, _dir) = test_app(&engine);

    let (status, _, _) = get(app, "/process?url=not%20a%20url").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_no_op_engine_reports_missing_tool() {
    let state = AppState::new(
        Arc::new(crate::engine::NoOpEngine),
        Arc::new(Config::default()),
        None,
    );
    let (status, _, body) = get(create_router(state), "/process?url=https://example.com/v").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("yt-dlp"), "{body}");
}

#[tokio::test]
async fn test_build_compiles_eligibility_from_catalog() {
    let engine = Arc::new(FakeEngine::default().with_catalog(&["Youtube", "CamSoda", "vimeo"]));
    let mut config = Config::default();
    config.catalog.denylist = vec!["cam".into()];

    let state = AppState::build(engine.clone(), Arc::new(config)).await.unwrap();

    let eligibility = state.eligibility.unwrap();
    assert_eq!(eligibility.entries(), ["default", "-camsoda"]);
}

#[tokio::test]
async fn test_build_without_catalog_filtering() {
    let engine = Arc::new(FakeEngine::default().with_catalog(&["camsoda"]));
    let mut config = Config::default();
    config.catalog.enabled = false;

    let state = AppState::build(engine, Arc::new(config)).await.unwrap();
    assert!(state.eligibility.is_none());
}

#[tokio::test]
async fn test_api_server_serves_and_shuts_down() {
    let engine = Arc::new(FakeEngine::default());
    let state = AppState::new(engine, Arc::new(Config::default()), None);
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(start_api_server(
        state,
        "127.0.0.1:0".parse().unwrap(),
        async move {
            rx.await.ok();
        },
    ));

    tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

// Used by the per-route test modules
fn files(media_id: &str, files: Vec<FakeFile>) -> FakeReply {
    FakeReply::Files {
        media_id: media_id.into(),
        files,
    }
}
