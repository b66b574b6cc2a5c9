//! Configuration types for ytdl-gateway
//!
//! Every field carries a serde default, so an empty TOML file (or no file at
//! all) yields a working configuration. Tables are built once at startup and
//! shared read-only afterwards.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Substrings that disable any extractor whose name contains them
pub const DEFAULT_DENYLIST: &[&str] = &[
    "sex",
    "porn",
    "xx",
    "redtube",
    "cam",
    "4tube",
    "load",
    "gasm",
    "bang",
    "iwara",
    "jizz",
    "mother",
    "kink",
    "fap",
    "strip",
    "toypics",
    "thisvid",
    "chaturbate",
    "rule34",
    "tube8",
    "erocast",
    "eroprofile",
    "manyvids",
    "fc2",
    "scrolller",
    "beeg",
    "peekvids",
    "playvids",
    "drtuber",
    "oftv",
    "nuvid",
    "noodlemagazine",
    "xvideos",
    "xhamster",
    "tnaflix",
    "empflix",
    "redgifs",
    "xstream",
    "pr0gramm",
    "myvidster",
    "murrtube",
    "goshgay",
];

/// HTTP listener configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to (default: 127.0.0.1:4444)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Extraction engine binding (the yt-dlp executable)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Arguments placed before every invocation, e.g. `["-m", "yt_dlp"]`
    /// when `binary_path` points at a Python interpreter
    #[serde(default)]
    pub leading_args: Vec<String>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// JavaScript runtime handed to the engine for player deciphering
    /// (default: node, empty string disables)
    #[serde(default = "default_js_runtime")]
    pub js_runtime: Option<String>,

    /// Ask the engine for debug output, forwarded to the debug sink
    #[serde(default)]
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            leading_args: Vec::new(),
            search_path: true,
            js_runtime: default_js_runtime(),
            verbose: false,
        }
    }
}

/// Format policy tables
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Protocol version assumed when a request carries none (default: 2)
    #[serde(default = "default_version")]
    pub default_version: u32,

    /// Extractor namespace the client identities are addressed to (default: "youtube")
    #[serde(default = "default_client_identity_namespace")]
    pub client_identity_namespace: String,

    /// Client identities the engine impersonates when listing streams
    ///
    /// More identities make the engine return more variants (merged
    /// higher-resolution streams) at the cost of more upstream requests.
    #[serde(default = "default_client_identities")]
    pub client_identities: Vec<String>,

    /// Fail the request when the engine warns about rate limiting (default: true)
    #[serde(default = "default_true")]
    pub rate_limit_escalation: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_version: default_version(),
            client_identity_namespace: default_client_identity_namespace(),
            client_identities: default_client_identities(),
            rate_limit_escalation: true,
        }
    }
}

/// Extractor catalog filtering
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Apply the denylist to the engine's extractor catalog (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Case-insensitive substrings; any extractor whose name contains one is disabled
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            denylist: default_denylist(),
        }
    }
}

/// Download behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Parent of the per-request work directories (default: "./downloads")
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Candidates larger than this are never selected (default: 5000 MiB)
    #[serde(default = "default_max_filesize_mib")]
    pub max_filesize_mib: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            max_filesize_mib: default_max_filesize_mib(),
        }
    }
}

/// Main configuration for the gateway
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Extraction engine binding
    #[serde(default)]
    pub engine: EngineConfig,

    /// Format policy tables
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Extractor catalog filtering
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Download behavior
    #[serde(default)]
    pub download: DownloadConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.policy.default_version == 0 {
            return Err(Error::config(
                "policy.default_version",
                "default_version must be at least 1",
            ));
        }

        if self.download.max_filesize_mib == 0 {
            return Err(Error::config(
                "download.max_filesize_mib",
                "max_filesize_mib must be greater than zero",
            ));
        }

        let distinct: HashSet<&str> = self
            .policy
            .client_identities
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if distinct.len() < 2 {
            return Err(Error::config(
                "policy.client_identities",
                "at least two distinct client identities are required",
            ));
        }

        if self.catalog.denylist.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::config(
                "catalog.denylist",
                "denylist tokens must not be empty (an empty token disables every extractor)",
            ));
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 4444))
}

fn default_js_runtime() -> Option<String> {
    Some("node".to_string())
}

fn default_version() -> u32 {
    2
}

fn default_client_identity_namespace() -> String {
    "youtube".to_string()
}

fn default_client_identities() -> Vec<String> {
    vec![
        "ios".to_string(),
        "web_creator".to_string(),
        "web_safari".to_string(),
    ]
}

fn default_denylist() -> Vec<String> {
    DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_filesize_mib() -> u64 {
    5000
}
