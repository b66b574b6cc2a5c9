//! Shared test helpers: a scripted engine that records every call.

use crate::bridge::LogSink;
use crate::engine::{EngineCapabilities, EngineOptions, ExtractionEngine};
use crate::error::{Error, Result};
use crate::types::{ExtractorDescriptor, Info};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One file the fake engine claims to have produced
#[derive(Clone, Debug)]
pub(crate) struct FakeFile {
    pub format_id: String,
    pub ext: String,
    pub vcodec: String,
    /// Whether the file is actually written to the output directory
    pub create: bool,
}

impl FakeFile {
    pub(crate) fn combined(format_id: &str, ext: &str) -> Self {
        Self {
            format_id: format_id.into(),
            ext: ext.into(),
            vcodec: "avc1.64001F".into(),
            create: true,
        }
    }

    pub(crate) fn video(format_id: &str, ext: &str) -> Self {
        Self {
            format_id: format_id.into(),
            ext: ext.into(),
            vcodec: "avc1.640028".into(),
            create: true,
        }
    }

    pub(crate) fn audio(format_id: &str, ext: &str) -> Self {
        Self {
            format_id: format_id.into(),
            ext: ext.into(),
            vcodec: "none".into(),
            create: true,
        }
    }

    /// Reported by the engine but never written
    pub(crate) fn missing(mut self) -> Self {
        self.create = false;
        self
    }
}

/// Scripted reply to one engine call
#[derive(Clone, Debug)]
pub(crate) enum FakeReply {
    /// Return this document from `extract`
    Info(Info),
    /// Report these files from `download` for the given media id
    Files { media_id: String, files: Vec<FakeFile> },
    /// Emit a warning through the sink, then return this document
    WarnThenInfo { warning: String, info: Info },
    /// Fail the call
    Fail(String),
}

/// A recorded engine call
#[derive(Clone, Debug)]
pub(crate) struct FakeCall {
    pub kind: &'static str,
    pub url: String,
    pub options: EngineOptions,
}

/// Engine replaying queued replies in order
#[derive(Default)]
pub(crate) struct FakeEngine {
    replies: Mutex<VecDeque<FakeReply>>,
    calls: Mutex<Vec<FakeCall>>,
    catalog: Vec<ExtractorDescriptor>,
}

impl FakeEngine {
    pub(crate) fn new(replies: Vec<FakeReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    pub(crate) fn with_catalog(mut self, names: &[&str]) -> Self {
        self.catalog = names.iter().map(ExtractorDescriptor::new).collect();
        self
    }

    pub(crate) fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Format expressions passed to `download`, in call order
    pub(crate) fn download_formats(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == "download")
            .filter_map(|call| call.options.policy.format)
            .collect()
    }

    fn next_reply(&self, kind: &'static str, url: &str, options: &EngineOptions) -> Result<FakeReply> {
        self.calls.lock().unwrap().push(FakeCall {
            kind,
            url: url.to_string(),
            options: options.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::UpstreamExtraction("no scripted reply left".into()))
    }
}

#[async_trait]
impl ExtractionEngine for FakeEngine {
    async fn extract(&self, url: &str, options: &EngineOptions, sink: &dyn LogSink) -> Result<Info> {
        match self.next_reply("extract", url, options)? {
            FakeReply::Info(info) => Ok(info),
            FakeReply::WarnThenInfo { warning, info } => {
                sink.on_warning(&warning);
                Ok(info)
            }
            FakeReply::Fail(message) => Err(Error::UpstreamExtraction(message)),
            FakeReply::Files { .. } => Err(Error::UpstreamExtraction(
                "files scripted for extract".into(),
            )),
        }
    }

    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        sink: &dyn LogSink,
    ) -> Result<Info> {
        match self.next_reply("download", url, options)? {
            FakeReply::Files { media_id, files } => {
                let dir = options
                    .output_dir
                    .clone()
                    .ok_or_else(|| Error::config("output_dir", "missing output directory"))?;
                let mut requested = Vec::new();
                for file in &files {
                    if file.create {
                        let name = format!("{}_{}.{}", media_id, file.format_id, file.ext);
                        std::fs::write(dir.join(name), b"media")?;
                    }
                    requested.push(json!({
                        "format_id": file.format_id,
                        "ext": file.ext,
                        "vcodec": file.vcodec,
                    }));
                }
                Ok(json!({ "id": media_id, "requested_downloads": requested }))
            }
            FakeReply::WarnThenInfo { warning, info } => {
                sink.on_warning(&warning);
                Ok(info)
            }
            FakeReply::Info(info) => Ok(info),
            FakeReply::Fail(message) => Err(Error::UpstreamExtraction(message)),
        }
    }

    fn sanitize(&self, info: Info) -> serde_json::Value {
        crate::engine::parser::sanitize_info(info)
    }

    async fn list_extractors(&self) -> Result<Vec<ExtractorDescriptor>> {
        Ok(self.catalog.clone())
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_extract: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
