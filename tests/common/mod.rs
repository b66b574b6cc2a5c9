//! Common test utilities for ytdl-gateway integration tests
//!
//! The engine is a shell script run through `/bin/sh`, standing in for the
//! yt-dlp executable. It answers `--list-extractors`, metadata extraction and
//! downloads, writing real files into the directory passed with `--paths`.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{StatusCode, header};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use ytdl_gateway::api::{AppState, create_router};
use ytdl_gateway::{CliEngine, Config};

/// Engine script: combined format unavailable, split download succeeds
pub const SPLIT_ONLY_ENGINE: &str = r#"
mode=extract
dir=""
fmt=""
while [ $# -gt 0 ]; do
  case "$1" in
    --list-extractors) mode=list ;;
    --no-simulate) mode=download ;;
    --paths) shift; dir="$1" ;;
    -f) shift; fmt="$1" ;;
  esac
  shift
done

case "$mode" in
  list)
    printf 'Youtube\nyoutube:tab\nCamSoda\nVimeo (CURRENTLY BROKEN)\n'
    ;;
  download)
    case "$fmt" in
      best*)
        echo 'ERROR: [youtube] abc: Requested format is not available' >&2
        exit 1
        ;;
    esac
    echo "[download] Destination: $dir/abc_137.mp4" >&2
    printf 'video' > "$dir/abc_137.mp4"
    printf 'audio' > "$dir/abc_140.m4a"
    echo '{"id": "abc", "requested_downloads": [{"format_id": "137", "ext": "mp4", "vcodec": "avc1.640028"}, {"format_id": "140", "ext": "m4a", "vcodec": "none"}]}'
    ;;
  *)
    echo '[youtube] abc: Downloading webpage' >&2
    echo "{\"id\": \"abc\", \"title\": \"Clip\", \"format\": \"$fmt\", \"__files_to_move\": {}}"
    ;;
esac
"#;

/// Engine script: keeps retrying after an HTTP 429 and never finishes on its own
pub const RATE_LIMITED_ENGINE: &str = r#"
for arg in "$@"; do
  if [ "$arg" = "--list-extractors" ]; then
    echo youtube
    exit 0
  fi
done
echo 'WARNING: [youtube] abc: HTTP Error 429: Too Many Requests. Retrying (1/10)...' >&2
sleep 30
echo '{"id": "abc"}'
"#;

/// Test fixture owning the script and the download root
pub struct Gateway {
    pub app: Router,
    pub state: AppState,
    pub temp_dir: TempDir,
}

impl Gateway {
    /// Build the full stack over a script engine
    pub async fn start(script: &str, adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let engine = script_engine(temp_dir.path(), script);

        let mut config = Config::default();
        config.download.work_dir = temp_dir.path().join("downloads");
        config.catalog.denylist = vec!["cam".into()];
        adjust(&mut config);

        let state = AppState::build(Arc::new(engine), Arc::new(config))
            .await
            .unwrap();
        let app = create_router(state.clone());

        Self {
            app,
            state,
            temp_dir,
        }
    }

    /// Directories created under the download root
    pub fn work_dirs(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.temp_dir.path().join("downloads")) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Send a GET and return status, content type and body
    pub async fn get(&self, uri: &str) -> (StatusCode, String, String) {
        let response = self
            .app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

/// Write `body` as a script and build an engine running it with `/bin/sh`
pub fn script_engine(dir: &Path, body: &str) -> CliEngine {
    let script = dir.join("fake-yt-dlp.sh");
    std::fs::write(&script, body).unwrap();
    CliEngine::new(PathBuf::from("/bin/sh")).with_leading_args(vec![script.display().to_string()])
}
