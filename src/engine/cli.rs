//! CLI-based extraction engine using the external yt-dlp program

use super::parser::{classify_line, parse_extractor_list, parse_info, sanitize_info};
use super::traits::{EngineCapabilities, EngineOptions, ExtractionEngine};
use crate::bridge::{EscalatingLogger, LogSink};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::types::{ExtractorDescriptor, Info, Severity};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Output template for downloads, relative to the work directory
///
/// Produces the deterministic `<mediaId>_<formatId>.<ext>` file names the
/// download orchestrator validates against.
pub const OUTPUT_TEMPLATE: &str = "%(id)s_%(format_id)s.%(ext)s";

/// CLI-based engine driving the yt-dlp executable
///
/// Every call spawns one child process. Its stderr is relayed line by line to
/// the request's [`LogSink`] while it runs; stdout carries the JSON document.
/// The child is killed if the call's future is dropped.
///
/// # Examples
///
/// ```no_run
/// use ytdl_gateway::engine::CliEngine;
/// use std::path::PathBuf;
///
/// // Explicit binary
/// let engine = CliEngine::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Python module instead of the standalone binary
/// let engine = CliEngine::new(PathBuf::from("python3"))
///     .with_leading_args(vec!["-m".into(), "yt_dlp".into()]);
///
/// // Or auto-discover from PATH
/// let engine = CliEngine::from_path().expect("yt-dlp not found in PATH");
/// ```
#[derive(Debug, Clone)]
pub struct CliEngine {
    binary_path: PathBuf,
    leading_args: Vec<String>,
    js_runtime: Option<String>,
    verbose: bool,
}

impl CliEngine {
    /// Create an engine with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            leading_args: Vec::new(),
            js_runtime: None,
            verbose: false,
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Uses the `which` crate to search for the `yt-dlp` binary.
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Build an engine from configuration, if a binary can be located
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        let engine = if let Some(ref path) = config.binary_path {
            Self::new(path.clone())
        } else if config.search_path {
            Self::from_path()?
        } else {
            return None;
        };

        Some(
            engine
                .with_leading_args(config.leading_args.clone())
                .with_js_runtime(config.js_runtime.clone().filter(|r| !r.is_empty()))
                .with_verbose(config.verbose),
        )
    }

    /// Arguments placed before every invocation
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    /// JavaScript runtime handed to the engine
    pub fn with_js_runtime(mut self, runtime: Option<String>) -> Self {
        self.js_runtime = runtime;
        self
    }

    /// Ask the engine for debug output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Path of the executable
    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    /// Arguments common to extraction and download
    fn policy_args(&self, options: &EngineOptions) -> Vec<String> {
        let policy = &options.policy;
        let mut args = vec!["--ignore-config".to_string()];

        if self.verbose {
            args.push("--verbose".to_string());
        }

        if let Some(ref runtime) = self.js_runtime {
            args.push("--js-runtimes".to_string());
            args.push(runtime.clone());
        }

        if let Some(ref format) = policy.format {
            args.push("-f".to_string());
            args.push(format.clone());
        }

        if let Some(ref proxy) = policy.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        if policy.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if policy.flatten_playlist {
            args.push("--flat-playlist".to_string());
        }
        if policy.restrict_filenames {
            args.push("--restrict-filenames".to_string());
        }
        if policy.write_subtitles {
            args.push("--write-subs".to_string());
        }
        if policy.write_auto_subtitles {
            args.push("--write-auto-subs".to_string());
        }

        if let Some(ref namespace) = policy.client_identity_namespace
            && !policy.client_identities.is_empty()
        {
            args.push("--extractor-args".to_string());
            args.push(format!(
                "{}:player_client={}",
                namespace,
                policy.client_identities.join(",")
            ));
        }

        if let Some(ref extractors) = options.extractors {
            args.push("--use-extractors".to_string());
            args.push(extractors.to_engine_arg());
        }

        args
    }

    /// Arguments for a metadata extraction
    pub(crate) fn extract_args(&self, url: &str, options: &EngineOptions) -> Vec<String> {
        let mut args = vec!["--dump-single-json".to_string()];
        args.extend(self.policy_args(options));
        args.push(url.to_string());
        args
    }

    /// Arguments for a download into `options.output_dir`
    pub(crate) fn download_args(&self, url: &str, options: &EngineOptions) -> Result<Vec<String>> {
        let output_dir = options.output_dir.as_ref().ok_or_else(|| {
            Error::config("output_dir", "download requires an output directory")
        })?;

        let mut args = vec![
            "--dump-single-json".to_string(),
            "--no-simulate".to_string(),
            "--paths".to_string(),
            output_dir.display().to_string(),
            "--output".to_string(),
            OUTPUT_TEMPLATE.to_string(),
        ];
        args.extend(self.policy_args(options));
        args.push(url.to_string());
        Ok(args)
    }

    /// Run the executable, relaying stderr to `sink`, and return stdout
    async fn run(&self, args: &[String], sink: &dyn LogSink) -> Result<Vec<u8>> {
        tracing::debug!(binary = %self.binary_path.display(), ?args, "spawning engine");

        let mut child = Command::new(&self.binary_path)
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::ExternalTool(format!(
                    "Failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ExternalTool("engine stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::ExternalTool("engine stderr was not captured".to_string()))?;

        let read_stdout = async {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        };

        let relay_stderr = async {
            let mut reader = BufReader::new(stderr);
            let mut line = Vec::new();
            let mut last_error = None;
            loop {
                line.clear();
                if reader.read_until(b'\n', &mut line).await? == 0 {
                    break;
                }
                let event = classify_line(&String::from_utf8_lossy(&line));
                if event.message.is_empty() {
                    continue;
                }
                if event.severity == Severity::Error {
                    last_error = Some(event.message.clone());
                }
                sink.dispatch(&event);
            }
            Ok::<_, std::io::Error>(last_error)
        };

        let (output, last_error) = tokio::try_join!(read_stdout, relay_stderr)?;
        let status = child.wait().await?;

        if !status.success() {
            return Err(Error::UpstreamExtraction(
                last_error.unwrap_or_else(|| format!("yt-dlp exited with {status}")),
            ));
        }

        Ok(output)
    }
}

#[async_trait]
impl ExtractionEngine for CliEngine {
    async fn extract(&self, url: &str, options: &EngineOptions, sink: &dyn LogSink) -> Result<Info> {
        let output = self.run(&self.extract_args(url, options), sink).await?;
        parse_info(&output)
    }

    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        sink: &dyn LogSink,
    ) -> Result<Info> {
        let args = self.download_args(url, options)?;
        let output = self.run(&args, sink).await?;
        parse_info(&output)
    }

    fn sanitize(&self, info: Info) -> serde_json::Value {
        sanitize_info(info)
    }

    async fn list_extractors(&self) -> Result<Vec<ExtractorDescriptor>> {
        let sink = EscalatingLogger::new(false);
        let args = ["--ignore-config".to_string(), "--list-extractors".to_string()];
        let output = self.run(&args, &sink).await?;
        Ok(parse_extractor_list(&output))
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_extract: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
