//! Two-phase download orchestration
//!
//! A download is an ordered chain of [`DownloadStrategy`] attempts evaluated
//! until one succeeds:
//!
//! 1. [`DownloadStrategy::Combined`]: one file carrying both tracks
//! 2. [`DownloadStrategy::Split`]: a video-only file plus an audio file
//!
//! Each attempt builds its format expression, runs the engine, then checks
//! the produced artifacts against the files actually on disk. Failures are
//! local to the attempt: they are logged and the next attempt runs. Only the
//! last failure reaches the caller, as [`DownloadOutcome::Failure`].

use crate::bridge::LogSink;
use crate::catalog::CatalogEligibility;
use crate::engine::{EngineOptions, ExtractionEngine};
use crate::error::{Error, Result};
use crate::policy::EXCLUSIONS;
use crate::types::{
    ArtifactRole, DownloadArtifact, DownloadOutcome, DownloadedMedia, ExtractionRequest,
    FormatPolicy, Info,
};
use std::path::Path;
use std::sync::Arc;

/// Video codec value the engine reports for audio-only streams
const NO_VIDEO_CODEC: &str = "none";

/// One download attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadStrategy {
    /// Single stream with audio and video
    Combined,
    /// Best video-only stream plus best audio stream
    Split,
}

impl DownloadStrategy {
    /// Label used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            DownloadStrategy::Combined => "combined",
            DownloadStrategy::Split => "split",
        }
    }

    /// Format expression for this attempt
    ///
    /// `<?` lets formats of unknown size through; known sizes above the cap
    /// are never selected.
    pub fn format_expression(&self, max_filesize_mib: u64) -> String {
        match self {
            DownloadStrategy::Combined => format!(
                "best[acodec!=none][vcodec!=none][filesize<?{max_filesize_mib}M]{EXCLUSIONS}"
            ),
            DownloadStrategy::Split => {
                format!("bv[filesize<?{max_filesize_mib}M]{EXCLUSIONS},ba")
            }
        }
    }

    /// Number of files a successful attempt produces
    pub fn expected_artifacts(&self) -> usize {
        match self {
            DownloadStrategy::Combined => 1,
            DownloadStrategy::Split => 2,
        }
    }

    fn failed(&self, reason: impl Into<String>) -> Error {
        Error::DownloadAttemptFailed {
            attempt: self.name(),
            reason: reason.into(),
        }
    }
}

/// A file listed in the engine's `requested_downloads`, not yet checked on disk
#[derive(Debug)]
struct ReportedFile {
    artifact: DownloadArtifact,
    audio_only: bool,
}

/// Runs the download strategy chain against an engine
pub struct DownloadOrchestrator {
    engine: Arc<dyn ExtractionEngine>,
    strategies: Vec<DownloadStrategy>,
    max_filesize_mib: u64,
}

impl DownloadOrchestrator {
    /// Combined attempt first, then split
    pub fn new(engine: Arc<dyn ExtractionEngine>, max_filesize_mib: u64) -> Self {
        Self {
            engine,
            strategies: vec![DownloadStrategy::Combined, DownloadStrategy::Split],
            max_filesize_mib,
        }
    }

    /// Attempt order
    pub fn strategies(&self) -> &[DownloadStrategy] {
        &self.strategies
    }

    /// Download `request.url` into `work_dir`
    ///
    /// Attempts run strictly in sequence; the first success wins. Never
    /// returns an error: every engine or validation failure becomes the
    /// attempt's failure, and the last one becomes [`DownloadOutcome::Failure`].
    /// Files already written are left in `work_dir`.
    pub async fn download(
        &self,
        request: &ExtractionRequest,
        policy: &FormatPolicy,
        extractors: Option<Arc<CatalogEligibility>>,
        work_dir: &Path,
        sink: &dyn LogSink,
    ) -> DownloadOutcome {
        let mut last_failure = String::from("no download strategy configured");

        for strategy in &self.strategies {
            // A request-level failure (rate-limit escalation) ends the chain
            if sink.is_failed() {
                tracing::debug!(
                    url = %request.url,
                    attempt = strategy.name(),
                    "request already failed, skipping remaining attempts"
                );
                break;
            }

            tracing::debug!(
                url = %request.url,
                attempt = strategy.name(),
                "starting download attempt"
            );

            match self
                .attempt(*strategy, request, policy, extractors.clone(), work_dir, sink)
                .await
            {
                Ok(media) => {
                    tracing::info!(
                        url = %request.url,
                        attempt = strategy.name(),
                        video = %media.video_path().display(),
                        audio = ?media.audio_path(),
                        "download complete"
                    );
                    return DownloadOutcome::Success(media);
                }
                Err(e) => {
                    tracing::warn!(
                        url = %request.url,
                        attempt = strategy.name(),
                        error = %e,
                        "download attempt failed"
                    );
                    last_failure = e.to_string();
                }
            }
        }

        DownloadOutcome::Failure(last_failure)
    }

    async fn attempt(
        &self,
        strategy: DownloadStrategy,
        request: &ExtractionRequest,
        policy: &FormatPolicy,
        extractors: Option<Arc<CatalogEligibility>>,
        work_dir: &Path,
        sink: &dyn LogSink,
    ) -> Result<DownloadedMedia> {
        let format = strategy.format_expression(self.max_filesize_mib);
        let options =
            EngineOptions::new(policy.with_format(format), extractors).with_output_dir(work_dir);

        let info = self
            .engine
            .download(&request.url, &options, sink)
            .await
            .map_err(|e| strategy.failed(e.to_string()))?;

        let reported = reported_files(&info, work_dir).map_err(|e| strategy.failed(e.to_string()))?;
        if reported.len() != strategy.expected_artifacts() {
            return Err(strategy.failed(format!(
                "expected {} file(s), engine produced {}",
                strategy.expected_artifacts(),
                reported.len()
            )));
        }

        for file in &reported {
            ensure_exists(&file.artifact.path)
                .await
                .map_err(|e| strategy.failed(e.to_string()))?;
        }

        match strategy {
            DownloadStrategy::Combined => {
                let mut files = reported.into_iter();
                match files.next() {
                    Some(file) => Ok(DownloadedMedia::Combined(DownloadArtifact {
                        role: ArtifactRole::Combined,
                        ..file.artifact
                    })),
                    None => Err(strategy.failed("engine produced no file")),
                }
            }
            DownloadStrategy::Split => {
                let (audio, video): (Vec<_>, Vec<_>) =
                    reported.into_iter().partition(|file| file.audio_only);
                match (<[_; 1]>::try_from(video), <[_; 1]>::try_from(audio)) {
                    (Ok([video]), Ok([audio])) => Ok(DownloadedMedia::Split {
                        video: DownloadArtifact {
                            role: ArtifactRole::Video,
                            ..video.artifact
                        },
                        audio: DownloadArtifact {
                            role: ArtifactRole::Audio,
                            ..audio.artifact
                        },
                    }),
                    _ => Err(strategy.failed("expected one video and one audio file")),
                }
            }
        }
    }
}

/// Files the engine reports, at their deterministic paths under `work_dir`
fn reported_files(info: &Info, work_dir: &Path) -> Result<Vec<ReportedFile>> {
    let media_id = info
        .get("id")
        .and_then(|id| id.as_str())
        .ok_or_else(|| Error::UpstreamExtraction("engine result has no media id".into()))?;

    let Some(downloads) = info.get("requested_downloads").and_then(|d| d.as_array()) else {
        return Ok(Vec::new());
    };

    downloads
        .iter()
        .map(|entry| {
            let field = |name: &str| {
                entry.get(name).and_then(|v| v.as_str()).ok_or_else(|| {
                    Error::UpstreamExtraction(format!("downloaded file has no {name}"))
                })
            };
            let format_id = field("format_id")?;
            let ext = field("ext")?;
            let audio_only = entry.get("vcodec").and_then(|v| v.as_str()) == Some(NO_VIDEO_CODEC);

            Ok(ReportedFile {
                artifact: DownloadArtifact {
                    role: if audio_only {
                        ArtifactRole::Audio
                    } else {
                        ArtifactRole::Video
                    },
                    path: work_dir.join(format!("{media_id}_{format_id}.{ext}")),
                    ext: ext.to_string(),
                    format_id: format_id.to_string(),
                },
                audio_only,
            })
        })
        .collect()
}

async fn ensure_exists(path: &Path) -> Result<()> {
    if tokio::fs::try_exists(path).await? {
        Ok(())
    } else {
        Err(Error::ArtifactMissing {
            path: path.to_path_buf(),
        })
    }
}
