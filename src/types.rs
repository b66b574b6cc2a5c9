//! Core types for ytdl-gateway

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Raw engine output: the metadata document for one URL
pub type Info = serde_json::Value;

/// Which flow an inbound request runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    /// Single-item metadata extraction (`/process`)
    Metadata,
    /// Flat playlist enumeration (`/process_playlist`)
    PlaylistMetadata,
    /// Materialize files locally (`/download`)
    Download,
}

impl RouteKind {
    /// Map a request path to its route
    ///
    /// Unrecognized paths are a configuration error naming the path.
    pub fn from_path(path: &str) -> Result<Self> {
        match path {
            "/process" => Ok(RouteKind::Metadata),
            "/process_playlist" => Ok(RouteKind::PlaylistMetadata),
            "/download" => Ok(RouteKind::Download),
            other => Err(Error::config("path", format!("no matching path: {other}"))),
        }
    }

    /// The HTTP path serving this route
    pub fn path(&self) -> &'static str {
        match self {
            RouteKind::Metadata => "/process",
            RouteKind::PlaylistMetadata => "/process_playlist",
            RouteKind::Download => "/download",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Metadata => write!(f, "metadata"),
            RouteKind::PlaylistMetadata => write!(f, "playlist-metadata"),
            RouteKind::Download => write!(f, "download"),
        }
    }
}

/// Protocol version requested by the caller
///
/// Versions select how much stream selection the gateway does on the
/// caller's behalf. Anything from 4 upward leaves selection to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VersionToken {
    /// Versions 1 and 2: one capped video stream
    CappedVideo(u32),
    /// Version 3: audio only, Opus preferred
    AudioOnly,
    /// Version 4 and later: every stream is returned
    Unrestricted(u32),
}

impl VersionToken {
    /// Interpret a numeric version
    pub fn from_number(version: u32) -> Result<Self> {
        match version {
            0 => Err(Error::config("version", "unrecognized version: 0")),
            1 | 2 => Ok(VersionToken::CappedVideo(version)),
            3 => Ok(VersionToken::AudioOnly),
            n => Ok(VersionToken::Unrestricted(n)),
        }
    }

    /// Parse a `version` query value
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let number: u32 = trimmed
            .parse()
            .map_err(|_| Error::config("version", format!("unrecognized version: {trimmed}")))?;
        Self::from_number(number)
    }

    /// The numeric version
    pub fn number(&self) -> u32 {
        match self {
            VersionToken::CappedVideo(n) | VersionToken::Unrestricted(n) => *n,
            VersionToken::AudioOnly => 3,
        }
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One inbound call, validated
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Target media URL
    pub url: String,
    /// Proxy for the engine's outbound traffic
    pub proxy: Option<String>,
    /// Protocol version
    pub version: VersionToken,
    /// Which flow to run
    pub route: RouteKind,
}

impl ExtractionRequest {
    /// Build a request, rejecting an empty or non-absolute URL
    ///
    /// An empty proxy value is treated as "no proxy".
    pub fn new(
        route: RouteKind,
        url: &str,
        proxy: Option<&str>,
        version: VersionToken,
    ) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::config("url", "missing required parameter: url"));
        }
        url::Url::parse(url)
            .map_err(|e| Error::config("url", format!("invalid url '{url}': {e}")))?;

        let proxy = proxy
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            url: url.to_string(),
            proxy,
            version,
            route,
        })
    }
}

/// Extraction policy for one request
///
/// Derived once per request and never changed afterwards; download attempts
/// derive their own copies through [`FormatPolicy::with_format`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FormatPolicy {
    /// Engine format-selector expression; `None` means the engine default
    pub format: Option<String>,
    /// Keep generated filenames ASCII and shell-safe
    pub restrict_filenames: bool,
    /// Request uploaded subtitles
    pub write_subtitles: bool,
    /// Request auto-generated subtitles
    pub write_auto_subtitles: bool,
    /// Enumerate playlist entries without resolving their streams
    pub flatten_playlist: bool,
    /// Treat a URL that names both a video and a playlist as the video only
    pub no_playlist: bool,
    /// Namespace the client identities apply to
    pub client_identity_namespace: Option<String>,
    /// Client identities the engine should impersonate, in order
    pub client_identities: Vec<String>,
    /// Proxy for the engine's outbound traffic
    pub proxy: Option<String>,
}

impl FormatPolicy {
    /// A copy of this policy with a different format expression
    pub fn with_format(&self, format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..self.clone()
        }
    }
}

/// Which track(s) a downloaded file carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRole {
    /// Audio and video muxed in one file
    Combined,
    /// Video-only half of a split download
    Video,
    /// Audio-only half of a split download
    Audio,
}

/// One file produced by a download attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DownloadArtifact {
    /// Track role
    pub role: ArtifactRole,
    /// Absolute path of the file
    pub path: PathBuf,
    /// Container extension (mp4, webm, m4a)
    pub ext: String,
    /// Engine format identifier
    pub format_id: String,
}

/// Files produced by a successful download
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadedMedia {
    /// One file with both tracks
    Combined(DownloadArtifact),
    /// Separate video and audio files
    Split {
        /// Video-only file
        video: DownloadArtifact,
        /// Audio-only file
        audio: DownloadArtifact,
    },
}

impl DownloadedMedia {
    /// Path of the file carrying the video track
    pub fn video_path(&self) -> &PathBuf {
        match self {
            DownloadedMedia::Combined(artifact) => &artifact.path,
            DownloadedMedia::Split { video, .. } => &video.path,
        }
    }

    /// Path of the separate audio file, if the download was split
    pub fn audio_path(&self) -> Option<&PathBuf> {
        match self {
            DownloadedMedia::Combined(_) => None,
            DownloadedMedia::Split { audio, .. } => Some(&audio.path),
        }
    }
}

/// Wire shape of a successful `/download` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResponse {
    /// File carrying the video track (the only file for combined downloads)
    pub video: PathBuf,
    /// Separate audio file for split downloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
}

impl From<&DownloadedMedia> for DownloadResponse {
    fn from(media: &DownloadedMedia) -> Self {
        Self {
            video: media.video_path().clone(),
            audio: media.audio_path().cloned(),
        }
    }
}

/// Terminal result of the download orchestrator
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// One of the attempts produced validated files
    Success(DownloadedMedia),
    /// Every attempt failed; the reason of the last one
    Failure(String),
}

impl DownloadOutcome {
    /// Whether the download produced files
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success(_))
    }

    /// Convert into a `Result`, mapping failure to [`Error::AllDownloadAttemptsFailed`]
    pub fn into_result(self) -> Result<DownloadedMedia> {
        match self {
            DownloadOutcome::Success(media) => Ok(media),
            DownloadOutcome::Failure(reason) => Err(Error::AllDownloadAttemptsFailed(reason)),
        }
    }
}

/// Severity of an engine log message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Diagnostic chatter
    Debug,
    /// Non-fatal condition reported by the engine
    Warning,
    /// Error reported by the engine
    Error,
}

/// A log message emitted by the engine during one call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
    /// Severity tag
    pub severity: Severity,
    /// Message text
    pub message: String,
}

impl LogEvent {
    /// Create a new event
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Catalog entry for one site-specific extractor known to the engine
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractorDescriptor {
    name: String,
}

impl ExtractorDescriptor {
    /// Create a descriptor; the name is normalized to lowercase
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_lowercase(),
        }
    }

    /// Lowercase-normalized extractor name
    pub fn name(&self) -> &str {
        &self.name
    }
}
