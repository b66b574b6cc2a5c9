//! Error types for ytdl-gateway
//!
//! Every failure that reaches the HTTP layer becomes a `500` response whose
//! body is the error's display string. The variants exist so that logging and
//! the download orchestrator can tell the failure kinds apart:
//! - request-shape problems ([`Error::Config`])
//! - engine failures ([`Error::UpstreamExtraction`], [`Error::UpstreamRateLimited`])
//! - download attempt outcomes ([`Error::DownloadAttemptFailed`],
//!   [`Error::AllDownloadAttemptsFailed`])

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ytdl-gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ytdl-gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or request-shape error (unknown route, bad version, missing url)
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message
        message: String,
        /// The configuration key or request parameter at fault (e.g., "version")
        key: Option<String>,
    },

    /// The extraction engine raised while resolving a URL
    #[error("extraction failed: {0}")]
    UpstreamExtraction(String),

    /// The engine reported a rate-limit condition as a warning and the request was failed
    #[error("rate limited by upstream: {0}")]
    UpstreamRateLimited(String),

    /// One download attempt failed; recovered by moving to the next attempt
    #[error("{attempt} download attempt failed: {reason}")]
    DownloadAttemptFailed {
        /// Attempt label ("combined" or "split")
        attempt: &'static str,
        /// Why the attempt was rejected
        reason: String,
    },

    /// Every download attempt was exhausted
    #[error("download failed: {0}")]
    AllDownloadAttemptsFailed(String),

    /// An expected artifact was not found on disk
    #[error("expected file missing: {}", path.display())]
    ArtifactMissing {
        /// The deterministic path where the file should have been written
        path: PathBuf,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("invalid configuration file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// External tool execution failed (spawn failure, unreadable output)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::UpstreamExtraction(_) => "upstream_extraction_error",
            Error::UpstreamRateLimited(_) => "upstream_rate_limited",
            Error::DownloadAttemptFailed { .. } => "download_attempt_failed",
            Error::AllDownloadAttemptsFailed(_) => "all_download_attempts_failed",
            Error::ArtifactMissing { .. } => "artifact_missing",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::TomlParse(_) => "config_parse_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}
