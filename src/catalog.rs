//! Extractor catalog filtering
//!
//! Compiles a denylist of substrings against the engine's live extractor
//! catalog into an eligibility list the engine understands: start from every
//! extractor enabled (`default`), then disable each denied one (`-name`).

use crate::config::Config;
use crate::engine::ExtractionEngine;
use crate::error::Result;
use crate::types::ExtractorDescriptor;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Sentinel entry enabling every extractor
pub const DEFAULT_ENTRY: &str = "default";

/// Eligibility list for the engine's extractor catalog
///
/// Always begins with [`DEFAULT_ENTRY`], followed by one `-<name>` entry per
/// excluded extractor in catalog order. Built once and shared read-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CatalogEligibility {
    entries: Vec<String>,
}

impl CatalogEligibility {
    /// Eligibility that disables nothing
    pub fn allow_all() -> Self {
        Self {
            entries: vec![DEFAULT_ENTRY.to_string()],
        }
    }

    /// All entries, sentinel first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Names of the disabled extractors, in catalog order
    pub fn disabled(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .skip(1)
            .filter_map(|entry| entry.strip_prefix('-'))
    }

    /// Number of disabled extractors
    pub fn disabled_count(&self) -> usize {
        self.entries.len() - 1
    }

    /// Whether an extractor name survives the filter
    pub fn is_enabled(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        !self.disabled().any(|disabled| disabled == name)
    }

    /// Comma-joined form, as passed to the engine's `--use-extractors`
    pub fn to_engine_arg(&self) -> String {
        self.entries.join(",")
    }
}

impl fmt::Display for CatalogEligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_engine_arg())
    }
}

/// Build the eligibility list for a catalog
///
/// An extractor is excluded iff its lowercase name contains any denylist token
/// (compared case-insensitively). Pure: identical inputs give identical output.
pub fn build_eligibility<S: AsRef<str>>(
    denylist: &[S],
    known_extractors: &[ExtractorDescriptor],
) -> CatalogEligibility {
    let tokens: Vec<String> = denylist
        .iter()
        .map(|token| token.as_ref().to_lowercase())
        .collect();

    let mut entries = Vec::with_capacity(1 + known_extractors.len() / 8);
    entries.push(DEFAULT_ENTRY.to_string());
    entries.extend(
        known_extractors
            .iter()
            .map(|descriptor| descriptor.name().to_lowercase())
            .filter(|name| tokens.iter().any(|token| name.contains(token.as_str())))
            .map(|name| format!("-{name}")),
    );

    CatalogEligibility { entries }
}

/// Enumerate the engine's live catalog and apply the configured denylist
pub async fn compile_eligibility(
    engine: &dyn ExtractionEngine,
    config: &Config,
) -> Result<CatalogEligibility> {
    let known = engine.list_extractors().await?;
    let eligibility = build_eligibility(&config.catalog.denylist, &known);

    tracing::info!(
        engine = engine.name(),
        known = known.len(),
        disabled = eligibility.disabled_count(),
        "extractor catalog filtered"
    );

    Ok(eligibility)
}

/// Write an eligibility list to `path` as a JSON array
pub async fn write_eligibility(eligibility: &CatalogEligibility, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(eligibility)?;
    tokio::fs::write(path, json).await?;

    tracing::info!(
        path = %path.display(),
        entries = eligibility.entries().len(),
        "wrote extractor eligibility list"
    );
    Ok(())
}
