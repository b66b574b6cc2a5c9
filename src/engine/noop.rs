//! No-op engine for graceful degradation

use super::traits::{EngineCapabilities, EngineOptions, ExtractionEngine};
use crate::bridge::LogSink;
use crate::types::{ExtractorDescriptor, Info};
use async_trait::async_trait;

/// Engine used when no yt-dlp executable is available or configured
///
/// Extraction and download return `Error::NotSupported`. The catalog is empty,
/// so catalog filtering compiles to `["default"]` and the server still starts.
///
/// # Examples
///
/// ```
/// use ytdl_gateway::bridge::EscalatingLogger;
/// use ytdl_gateway::engine::{EngineOptions, ExtractionEngine, NoOpEngine};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = NoOpEngine;
/// let logger = EscalatingLogger::new(true);
///
/// let result = engine
///     .extract("https://example.com/watch/1", &EngineOptions::default(), &logger)
///     .await;
/// assert!(result.is_err());
/// assert!(engine.list_extractors().await?.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct NoOpEngine;

#[async_trait]
impl ExtractionEngine for NoOpEngine {
    async fn extract(
        &self,
        _url: &str,
        _options: &EngineOptions,
        _sink: &dyn LogSink,
    ) -> crate::Result<Info> {
        Err(crate::Error::NotSupported(
            "extraction requires the external yt-dlp binary. \
             Configure engine.binary_path or ensure yt-dlp is in PATH."
                .into(),
        ))
    }

    async fn download(
        &self,
        _url: &str,
        _options: &EngineOptions,
        _sink: &dyn LogSink,
    ) -> crate::Result<Info> {
        Err(crate::Error::NotSupported(
            "download requires the external yt-dlp binary. \
             Configure engine.binary_path or ensure yt-dlp is in PATH."
                .into(),
        ))
    }

    fn sanitize(&self, info: Info) -> serde_json::Value {
        super::parser::sanitize_info(info)
    }

    async fn list_extractors(&self) -> crate::Result<Vec<ExtractorDescriptor>> {
        Ok(Vec::new())
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_extract: false,
            can_download: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::EscalatingLogger;

    #[tokio::test]
    async fn test_extract_returns_not_supported() {
        let engine = NoOpEngine;
        let logger = EscalatingLogger::new(true);
        let result = engine
            .extract("https://example.com/v", &EngineOptions::default(), &logger)
            .await;
        assert!(matches!(result, Err(crate::Error::NotSupported(_))));
    }

    #[tokio::test]
    async fn test_download_returns_not_supported() {
        let engine = NoOpEngine;
        let logger = EscalatingLogger::new(true);
        let options = EngineOptions::default().with_output_dir("/tmp/unused");
        let result = engine.download("https://example.com/v", &options, &logger).await;

        match result {
            Err(crate::Error::NotSupported(msg)) => assert!(msg.contains("yt-dlp")),
            other => panic!("expected NotSupported, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        assert!(NoOpEngine.list_extractors().await.unwrap().is_empty());
    }

    #[test]
    fn test_capabilities_and_name() {
        let caps = NoOpEngine.capabilities();
        assert!(!caps.can_extract);
        assert!(!caps.can_download);
        assert_eq!(NoOpEngine.name(), "noop");
    }
}
