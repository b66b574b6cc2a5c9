//! Parsers for yt-dlp command output

use crate::error::{Error, Result};
use crate::types::{ExtractorDescriptor, Info, LogEvent, Severity};
use serde_json::Value;

const WARNING_PREFIX: &str = "WARNING:";
const ERROR_PREFIX: &str = "ERROR:";

/// Classify one stderr line from yt-dlp
///
/// `WARNING:` and `ERROR:` prefixes map to their severities (prefix stripped);
/// everything else, including `[debug]` lines, is debug output.
pub fn classify_line(line: &str) -> LogEvent {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(rest) = line.strip_prefix(WARNING_PREFIX) {
        LogEvent::new(Severity::Warning, rest.trim_start())
    } else if let Some(rest) = line.strip_prefix(ERROR_PREFIX) {
        LogEvent::new(Severity::Error, rest.trim_start())
    } else {
        LogEvent::new(Severity::Debug, line)
    }
}

/// Parse the single JSON document printed by `--dump-single-json`
pub fn parse_info(stdout: &[u8]) -> Result<Info> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::UpstreamExtraction(
            "engine produced no metadata".to_string(),
        ));
    }

    let info: Value = serde_json::from_str(trimmed)?;
    if !info.is_object() {
        return Err(Error::UpstreamExtraction(format!(
            "engine produced unexpected metadata type: {}",
            json_type_name(&info)
        )));
    }
    Ok(info)
}

/// Parse the output of `--list-extractors`
///
/// One extractor per line; trailing annotations such as
/// `(CURRENTLY BROKEN)` are dropped, blank lines skipped.
pub fn parse_extractor_list(stdout: &[u8]) -> Vec<ExtractorDescriptor> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(ExtractorDescriptor::new)
        .collect()
}

/// Remove engine-private keys (`__` prefix) from a document, recursively
pub fn sanitize_info(info: Value) -> Value {
    match info {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| !key.starts_with("__"))
                .map(|(key, value)| (key, sanitize_info(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_info).collect()),
        other => other,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
