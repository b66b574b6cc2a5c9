//! Traits and types for the extraction engine

use crate::bridge::LogSink;
use crate::catalog::CatalogEligibility;
use crate::types::{ExtractorDescriptor, FormatPolicy, Info};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Options bundle for one engine call
#[derive(Clone, Debug, Default)]
pub struct EngineOptions {
    /// Format expression, flags and client identities
    pub policy: FormatPolicy,
    /// Extractor eligibility; `None` leaves the engine's catalog untouched
    pub extractors: Option<Arc<CatalogEligibility>>,
    /// Directory downloaded files are written to (download calls only)
    pub output_dir: Option<PathBuf>,
}

impl EngineOptions {
    /// Options for a metadata extraction
    pub fn new(policy: FormatPolicy, extractors: Option<Arc<CatalogEligibility>>) -> Self {
        Self {
            policy,
            extractors,
            output_dir: None,
        }
    }

    /// The same options writing files into `dir`
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

/// Capabilities of an engine implementation
#[derive(Debug, Clone, Copy)]
pub struct EngineCapabilities {
    /// Can resolve metadata
    pub can_extract: bool,
    /// Can materialize files
    pub can_download: bool,
}

/// Trait for the external extraction engine
///
/// Resolves a media URL into stream metadata and optionally performs the
/// transfer. Implementations report progress through the [`LogSink`] handed
/// to each call; the sink belongs to a single request.
///
/// # Examples
///
/// ```no_run
/// use ytdl_gateway::bridge::EscalatingLogger;
/// use ytdl_gateway::engine::{CliEngine, EngineOptions, ExtractionEngine};
/// use ytdl_gateway::types::FormatPolicy;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = CliEngine::from_path().expect("yt-dlp not found in PATH");
/// let logger = EscalatingLogger::new(true);
///
/// let options = EngineOptions::new(FormatPolicy::default(), None);
/// let info = engine
///     .extract("https://example.com/watch/1", &options, &logger)
///     .await?;
/// println!("{}", engine.sanitize(info));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Resolve metadata for a URL without downloading
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UpstreamExtraction`] when the engine fails, or
    /// [`crate::Error::NotSupported`] when no engine is available.
    async fn extract(&self, url: &str, options: &EngineOptions, sink: &dyn LogSink)
    -> crate::Result<Info>;

    /// Resolve metadata and download the selected formats into `options.output_dir`
    ///
    /// The returned document lists the produced files under `requested_downloads`.
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        sink: &dyn LogSink,
    ) -> crate::Result<Info>;

    /// Make an engine document safe to serialize for clients
    fn sanitize(&self, info: Info) -> serde_json::Value;

    /// Enumerate the extractor catalog
    async fn list_extractors(&self) -> crate::Result<Vec<ExtractorDescriptor>>;

    /// Query capabilities of this engine
    fn capabilities(&self) -> EngineCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
