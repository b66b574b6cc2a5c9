//! # ytdl-gateway
//!
//! Stateless HTTP front-end over the yt-dlp extraction engine.
//!
//! A media URL goes in; either structured stream metadata or locally
//! downloaded files come out. The site-specific scraping is delegated to the
//! engine. This crate is the orchestration around it:
//!
//! - [`policy`]: request parameters to a format expression and engine flags
//! - [`catalog`]: denylist compiled against the engine's extractor catalog
//! - [`bridge`]: engine log sink that turns rate-limit warnings into failures
//! - [`orchestrator`]: combined-track download with a split-track fallback
//! - [`api`]: the `/process`, `/process_playlist` and `/download` routes
//!
//! ## Quick Start
//!
//! ```no_run
//! use ytdl_gateway::{Config, api};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(std::path::Path::new("ytdl-gateway.toml"))?;
//!
//!     // Serves until SIGINT/SIGTERM
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP server
pub mod api;
/// Engine log sink and rate-limit escalation
pub mod bridge;
/// Extractor catalog filtering
pub mod catalog;
/// Configuration types
pub mod config;
/// Extraction engine binding
pub mod engine;
/// Error types
pub mod error;
/// Combined-then-split download chain
pub mod orchestrator;
/// Format policy selection
pub mod policy;
/// Core request and result types
pub mod types;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use bridge::{EscalatingLogger, LogSink, run_guarded};
pub use catalog::{CatalogEligibility, build_eligibility};
pub use config::Config;
pub use engine::{CliEngine, EngineOptions, ExtractionEngine, NoOpEngine, select_engine};
pub use error::{Error, Result};
pub use orchestrator::{DownloadOrchestrator, DownloadStrategy};
pub use policy::PolicySelector;
pub use types::{
    DownloadOutcome, DownloadResponse, DownloadedMedia, ExtractionRequest, ExtractorDescriptor,
    FormatPolicy, Info, LogEvent, RouteKind, Severity, VersionToken,
};

/// Resolve on Ctrl+C, or on SIGTERM where the platform has it
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
