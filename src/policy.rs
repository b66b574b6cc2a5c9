//! Format policy selection
//!
//! Maps a (route, version, proxy) tuple onto a [`FormatPolicy`]: the engine
//! format expression plus the feature flags and client identities that go
//! with it. The tables are fixed at construction and shared read-only.

use crate::config::PolicyConfig;
use crate::error::Result;
use crate::types::{FormatPolicy, RouteKind, VersionToken};

/// Clauses appended to every restrictive expression: never the source-quality
/// pseudo-format, never AV1 or VP9
pub const EXCLUSIONS: &str = "[format_id!=source][vcodec!*=av01][vcodec!*=vp9]";

/// Best 1080p at no more than 30fps, otherwise the best at or under 720p
pub const CAPPED_VIDEO_FORMAT: &str = "(best[height = 1080][fps <= 30]/best[height <=? 720])";

/// Best Opus audio, otherwise the best audio of any codec
pub const AUDIO_FORMAT: &str = "(bestaudio[acodec=opus]/bestaudio)";

/// Builds per-request format policies from the configured tables
#[derive(Clone, Debug)]
pub struct PolicySelector {
    client_identity_namespace: String,
    client_identities: Vec<String>,
}

impl PolicySelector {
    /// Create a selector from the policy tables
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            client_identity_namespace: config.client_identity_namespace.clone(),
            client_identities: config.client_identities.clone(),
        }
    }

    /// Select the policy for one request
    ///
    /// - playlist metadata: flat enumeration, no format expression
    /// - metadata: version-dependent expression plus subtitle/filename flags
    /// - download: same flags, expression left to the download orchestrator
    pub fn select(
        &self,
        route: RouteKind,
        version: VersionToken,
        proxy: Option<&str>,
    ) -> Result<FormatPolicy> {
        let proxy = proxy
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let policy = match route {
            RouteKind::PlaylistMetadata => FormatPolicy {
                flatten_playlist: true,
                ..Default::default()
            },
            RouteKind::Metadata => FormatPolicy {
                format: metadata_format(version),
                proxy,
                ..self.single_item_policy()
            },
            RouteKind::Download => FormatPolicy {
                proxy,
                ..self.single_item_policy()
            },
        };

        tracing::debug!(
            %route,
            %version,
            format = policy.format.as_deref().unwrap_or("<engine default>"),
            "selected format policy"
        );

        Ok(policy)
    }

    fn single_item_policy(&self) -> FormatPolicy {
        FormatPolicy {
            format: None,
            restrict_filenames: true,
            write_subtitles: true,
            write_auto_subtitles: true,
            flatten_playlist: false,
            no_playlist: true,
            client_identity_namespace: Some(self.client_identity_namespace.clone()),
            client_identities: self.client_identities.clone(),
            proxy: None,
        }
    }
}

/// Format expression for the metadata route
fn metadata_format(version: VersionToken) -> Option<String> {
    match version {
        VersionToken::CappedVideo(_) => Some(format!("{CAPPED_VIDEO_FORMAT}{EXCLUSIONS}")),
        VersionToken::AudioOnly => Some(format!("{AUDIO_FORMAT}{EXCLUSIONS}")),
        VersionToken::Unrestricted(_) => None,
    }
}
