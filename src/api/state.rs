//! Application state for the API server

use crate::catalog::{CatalogEligibility, compile_eligibility};
use crate::engine::ExtractionEngine;
use crate::orchestrator::DownloadOrchestrator;
use crate::policy::PolicySelector;
use crate::{Config, Result};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones). Everything in here is
/// read-only once built; per-request state lives in the handlers.
#[derive(Clone)]
pub struct AppState {
    /// Extraction engine binding
    pub engine: Arc<dyn ExtractionEngine>,

    /// Format policy tables
    pub selector: Arc<PolicySelector>,

    /// Combined-then-split download chain
    pub orchestrator: Arc<DownloadOrchestrator>,

    /// Extractor eligibility, `None` when catalog filtering is disabled
    pub eligibility: Option<Arc<CatalogEligibility>>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create state from an already compiled eligibility list
    pub fn new(
        engine: Arc<dyn ExtractionEngine>,
        config: Arc<Config>,
        eligibility: Option<CatalogEligibility>,
    ) -> Self {
        let selector = Arc::new(PolicySelector::new(&config.policy));
        let orchestrator = Arc::new(DownloadOrchestrator::new(
            engine.clone(),
            config.download.max_filesize_mib,
        ));

        Self {
            engine,
            selector,
            orchestrator,
            eligibility: eligibility.map(Arc::new),
            config,
        }
    }

    /// Create state, compiling the eligibility list from the engine's live catalog
    ///
    /// The catalog is enumerated once here; restart the process to pick up a
    /// new engine version.
    pub async fn build(engine: Arc<dyn ExtractionEngine>, config: Arc<Config>) -> Result<Self> {
        let eligibility = if config.catalog.enabled {
            Some(compile_eligibility(engine.as_ref(), &config).await?)
        } else {
            tracing::info!("extractor catalog filtering disabled");
            None
        };

        Ok(Self::new(engine, config, eligibility))
    }
}
