//! Extraction engine binding
//!
//! The engine resolves URLs into stream metadata and performs transfers. It is
//! an external program (yt-dlp) driven as a child process; this module hides
//! that behind the [`ExtractionEngine`] trait.
//!
//! ## Architecture
//!
//! - [`CliEngine`]: spawns yt-dlp, relays its stderr to the request's log sink
//! - [`NoOpEngine`]: stand-in when no binary is available
//!
//! [`select_engine`] picks one from configuration: explicit binary path, then
//! a PATH search, then the no-op fallback.
//!
//! ## Usage
//!
//! ```no_run
//! use ytdl_gateway::bridge::EscalatingLogger;
//! use ytdl_gateway::config::EngineConfig;
//! use ytdl_gateway::engine::{EngineOptions, select_engine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = select_engine(&EngineConfig::default());
//!     let logger = EscalatingLogger::new(true);
//!
//!     let info = engine
//!         .extract("https://example.com/watch/1", &EngineOptions::default(), &logger)
//!         .await?;
//!     println!("{}", info["title"]);
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
pub(crate) mod parser;
mod traits;

pub use cli::{CliEngine, OUTPUT_TEMPLATE};
pub use noop::NoOpEngine;
pub use traits::{EngineCapabilities, EngineOptions, ExtractionEngine};

use crate::config::EngineConfig;
use std::sync::Arc;

/// Choose the engine implementation for a configuration
///
/// Never fails: without a usable binary the [`NoOpEngine`] is returned and
/// every extraction reports `NotSupported`.
pub fn select_engine(config: &EngineConfig) -> Arc<dyn ExtractionEngine> {
    let engine: Arc<dyn ExtractionEngine> = match CliEngine::from_config(config) {
        Some(engine) => Arc::new(engine),
        None => {
            tracing::warn!(
                search_path = config.search_path,
                "yt-dlp not found, extraction disabled"
            );
            Arc::new(NoOpEngine)
        }
    };

    let caps = engine.capabilities();
    tracing::info!(
        engine = engine.name(),
        can_extract = caps.can_extract,
        can_download = caps.can_download,
        "Extraction engine initialized"
    );

    engine
}
