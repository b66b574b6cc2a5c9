//! Engine log sink and rate-limit escalation
//!
//! The engine reports progress through a three-method [`LogSink`]. The
//! [`EscalatingLogger`] forwards everything to `tracing` and turns rate-limit
//! warnings into a request failure: the engine treats HTTP 429 as retryable
//! and may keep retrying for a very long time without ever raising.
//!
//! A logger belongs to exactly one request. [`run_guarded`] races the engine
//! call against the logger's failure signal so a caller never waits on an
//! engine that has already been judged failed.

use crate::error::{Error, Result};
use crate::types::{LogEvent, Severity};
use std::future::Future;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// Markers identifying a rate-limit warning
const RATE_LIMIT_MARKERS: &[&str] = &["429", "Too Many Request"];

/// Logging contract between the extraction engine and this layer
///
/// Called synchronously by the engine while an extraction or download runs.
pub trait LogSink: Send + Sync {
    /// Diagnostic message
    fn on_debug(&self, message: &str);

    /// Non-fatal condition
    fn on_warning(&self, message: &str);

    /// Error reported by the engine
    fn on_error(&self, message: &str);

    /// Whether the request this sink belongs to has already failed
    fn is_failed(&self) -> bool {
        false
    }

    /// Dispatch an event to the matching sink method
    fn dispatch(&self, event: &LogEvent) {
        match event.severity {
            Severity::Debug => self.on_debug(&event.message),
            Severity::Warning => self.on_warning(&event.message),
            Severity::Error => self.on_error(&event.message),
        }
    }
}

/// Whether a warning signals upstream rate limiting
pub fn is_rate_limit_warning(message: &str) -> bool {
    RATE_LIMIT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Per-request sink that fails the request on rate-limit warnings
#[derive(Debug)]
pub struct EscalatingLogger {
    escalate_rate_limits: bool,
    failure: OnceLock<String>,
    failed: CancellationToken,
}

impl EscalatingLogger {
    /// Create a logger; `escalate_rate_limits = false` only logs rate-limit warnings
    pub fn new(escalate_rate_limits: bool) -> Self {
        Self {
            escalate_rate_limits,
            failure: OnceLock::new(),
            failed: CancellationToken::new(),
        }
    }

    /// Mark the request failed; the first message wins
    pub fn fail(&self, message: &str) {
        if self.failure.set(message.to_string()).is_ok() {
            tracing::error!(target: "engine", reason = message, "failing request");
        }
        self.failed.cancel();
    }

    /// The recorded failure, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.get().map(String::as_str)
    }

    /// Resolves once the request is marked failed
    pub async fn failed(&self) {
        self.failed.cancelled().await
    }

    fn escalation_error(&self) -> Error {
        Error::UpstreamRateLimited(self.failure().unwrap_or("request failed").to_string())
    }
}

impl LogSink for EscalatingLogger {
    fn on_debug(&self, message: &str) {
        tracing::debug!(target: "engine", "{}", message);
    }

    fn on_warning(&self, message: &str) {
        tracing::warn!(target: "engine", "{}", message);

        if self.escalate_rate_limits && is_rate_limit_warning(message) {
            self.fail(message);
        }
    }

    fn on_error(&self, message: &str) {
        tracing::error!(target: "engine", "{}", message);
    }

    fn is_failed(&self) -> bool {
        self.failed.is_cancelled()
    }
}

/// Run an engine operation under a logger's failure signal
///
/// If the logger fails first, the operation future is dropped (killing any
/// child process it owns). A failure recorded while the operation was
/// finishing still takes precedence over its result.
pub async fn run_guarded<T, F>(logger: &EscalatingLogger, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = logger.failed() => Err(logger.escalation_error()),
        result = operation => {
            if logger.is_failed() {
                Err(logger.escalation_error())
            } else {
                result
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rate_limit_markers() {
        assert!(is_rate_limit_warning("HTTP Error 429: Too Many Requests"));
        assert!(is_rate_limit_warning("[youtube] abc: 429"));
        assert!(is_rate_limit_warning("Got Too Many Requests from upstream"));
        assert!(!is_rate_limit_warning("Falling back to generic n function search"));
        assert!(!is_rate_limit_warning("HTTP Error 403: Forbidden"));
    }

    #[test]
    fn test_warning_with_429_marks_failed() {
        let logger = EscalatingLogger::new(true);
        logger.on_warning("[download] Got error: HTTP Error 429: Too Many Requests");

        assert!(logger.is_failed());
        assert_eq!(
            logger.failure(),
            Some("[download] Got error: HTTP Error 429: Too Many Requests")
        );
    }

    #[test]
    fn test_warning_with_phrase_marks_failed() {
        let logger = EscalatingLogger::new(true);
        logger.on_warning("Too Many Requests");
        assert!(logger.is_failed());
    }

    #[test]
    fn test_plain_warning_does_not_fail() {
        let logger = EscalatingLogger::new(true);
        logger.on_warning("Some formats may be missing");
        logger.on_debug("429 in a debug line is ignored");
        logger.on_error("429 in an error line is only logged");

        assert!(!logger.is_failed());
        assert_eq!(logger.failure(), None);
    }

    #[test]
    fn test_escalation_can_be_disabled() {
        let logger = EscalatingLogger::new(false);
        logger.on_warning("HTTP Error 429: Too Many Requests");
        assert!(!logger.is_failed());
    }

    #[test]
    fn test_first_failure_wins() {
        let logger = EscalatingLogger::new(true);
        logger.on_warning("first 429");
        logger.on_warning("second 429");
        assert_eq!(logger.failure(), Some("first 429"));
    }

    #[test]
    fn test_dispatch_routes_by_severity() {
        let logger = EscalatingLogger::new(true);
        logger.dispatch(&LogEvent::new(Severity::Debug, "429"));
        assert!(!logger.is_failed());
        logger.dispatch(&LogEvent::new(Severity::Warning, "429"));
        assert!(logger.is_failed());
    }

    #[tokio::test]
    async fn test_run_guarded_passes_through_result() {
        let logger = EscalatingLogger::new(true);
        let value = run_guarded(&logger, async { Ok::<_, Error>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_guarded_interrupts_hung_operation() {
        let logger = EscalatingLogger::new(true);

        let operation = async {
            logger.on_warning("HTTP Error 429: Too Many Requests");
            // The engine keeps retrying and never returns on its own
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, Error>(())
        };

        let result = tokio::time::timeout(Duration::from_secs(5), run_guarded(&logger, operation))
            .await
            .expect("guard should not wait for the operation");

        match result {
            Err(Error::UpstreamRateLimited(message)) => assert!(message.contains("429")),
            other => panic!("expected rate-limit failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_guarded_failure_recorded_before_completion_wins() {
        let logger = EscalatingLogger::new(true);
        let result = run_guarded(&logger, async {
            logger.on_warning("429");
            Ok::<_, Error>("engine thought it was fine")
        })
        .await;

        assert!(matches!(result, Err(Error::UpstreamRateLimited(_))));
    }
}
