//! Per-request pipeline: parse → advise → dispatch → resolve.
//!
//! A run never returns an error to the watch loop. Every failure category
//! except artifact I/O becomes an `Errored` outcome; artifact I/O failure is
//! logged inside the resolver and swallowed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info, warn};

use crate::advisory::{self, AdvisoryDecision};
use crate::config::RelayConfig;
use crate::dispatch::{self, Mode};
use crate::error::DispatchError;
use crate::host::HostCapabilities;
use crate::outcome::{self, Outcome};
use crate::parser::parse_request;

/// Processes one request artifact end to end.
pub struct Pipeline {
    inbox: PathBuf,
    host: Arc<dyn HostCapabilities>,
    config: RelayConfig,
}

impl Pipeline {
    pub fn new(inbox: PathBuf, host: Arc<dyn HostCapabilities>, config: RelayConfig) -> Self {
        Self {
            inbox,
            host,
            config,
        }
    }

    pub fn inbox(&self) -> &Path {
        &self.inbox
    }

    /// Run the pipeline for one request artifact.
    ///
    /// Returns the terminal outcome, or `None` when the artifact vanished
    /// before it could be read (no outcome without a request).
    pub async fn run(&self, artifact: &Path) -> Option<Outcome> {
        let id = artifact
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let raw = match fs::read_to_string(artifact).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // No request left to resolve; the name leaves the in-flight
                // set and a later artifact under the same name is fresh.
                warn!(id, "Request artifact vanished before read, skipping");
                return None;
            }
            Err(e) => {
                // Still present but unreadable (invalid UTF-8, permissions):
                // resolves like any malformed input, never re-dispatched.
                warn!(id, error = %e, "Request artifact unreadable");
                let outcome = Outcome::Errored {
                    reason: format!("request artifact unreadable: {e}"),
                };
                outcome::resolve(&self.inbox, &id, &outcome).await;
                return Some(outcome);
            }
        };

        info!(id, "Processing request artifact");
        let outcome = self.evaluate(&raw).await;
        outcome::resolve(&self.inbox, &id, &outcome).await;
        Some(outcome)
    }

    /// Turn raw request text into a terminal outcome. No artifact I/O here.
    async fn evaluate(&self, raw: &str) -> Outcome {
        let request = match parse_request(raw) {
            Ok(request) => request,
            Err(e) => {
                return Outcome::Errored {
                    reason: e.to_string(),
                };
            }
        };

        let mode: Mode = match request.mode.parse() {
            Ok(mode) => mode,
            Err(e) => {
                return Outcome::Errored {
                    reason: e.to_string(),
                };
            }
        };

        // Fresh read per request, evaluated before any host invocation.
        let loaded = advisory::load(&self.inbox).await;
        let warning = match advisory::evaluate(loaded.as_ref(), mode) {
            AdvisoryDecision::Proceed => None,
            AdvisoryDecision::WarnAndProceed { warning } => {
                debug!(session = request.short_session_id(), %warning, "Advisory warning");
                Some(warning)
            }
            AdvisoryDecision::Block { reason } => {
                return Outcome::Errored {
                    reason: DispatchError::ContextBlocked { reason }.to_string(),
                };
            }
        };

        match dispatch::dispatch(mode, &request, self.host.as_ref(), &self.config).await {
            Ok(note) => match warning {
                Some(warning) => Outcome::WarnedAndAcknowledged { warning, note },
                None => Outcome::Acknowledged { note },
            },
            Err(e) => Outcome::Errored {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::ADVISORY_FILE;
    use crate::host::mock::{HostCall, RecordingHost};
    use tempfile::TempDir;

    async fn drop_request(dir: &TempDir, id: &str, body: &str) -> PathBuf {
        let path = dir.path().join(format!("{id}.msg"));
        fs::write(&path, body).await.unwrap();
        path
    }

    fn pipeline(dir: &TempDir, host: Arc<RecordingHost>) -> Pipeline {
        Pipeline::new(dir.path().to_path_buf(), host, RelayConfig::fast())
    }

    #[tokio::test]
    async fn valid_send_acknowledges_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        let artifact = drop_request(&dir, "a1", "sess-12345678|send|hello").await;

        let outcome = pipeline(&dir, host.clone()).run(&artifact).await.unwrap();
        assert!(matches!(outcome, Outcome::Acknowledged { .. }));
        assert_eq!(
            host.calls(),
            vec![HostCall::Submit {
                query: "hello".to_string(),
                partial: false,
            }]
        );
        assert!(!artifact.exists());
        assert!(dir.path().join("a1.ack").exists());
    }

    #[tokio::test]
    async fn malformed_request_never_touches_host() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        let artifact = drop_request(&dir, "a2", "just-two|segments").await;

        let outcome = pipeline(&dir, host.clone()).run(&artifact).await.unwrap();
        match outcome {
            Outcome::Errored { reason } => assert!(reason.contains("segments")),
            other => panic!("expected Errored, got {other:?}"),
        }
        assert!(host.calls().is_empty());
        assert!(!artifact.exists());
        assert!(dir.path().join("a2.err").exists());
    }

    #[tokio::test]
    async fn unknown_mode_errors_with_supported_list() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        let artifact = drop_request(&dir, "a3", "sess|frobnicate|hello").await;

        let outcome = pipeline(&dir, host.clone()).run(&artifact).await.unwrap();
        match outcome {
            Outcome::Errored { reason } => {
                assert!(reason.contains("frobnicate"));
                assert!(reason.contains("stop-and-send"));
                assert!(reason.contains("compact"));
            }
            other => panic!("expected Errored, got {other:?}"),
        }
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn steer_blocked_at_high_context() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        fs::write(dir.path().join(ADVISORY_FILE), "context_pct: 97\n")
            .await
            .unwrap();
        let artifact = drop_request(&dir, "a4", "sess|steer|urgent").await;

        let outcome = pipeline(&dir, host.clone()).run(&artifact).await.unwrap();
        match outcome {
            Outcome::Errored { reason } => {
                assert!(reason.starts_with("Context blocked"));
                assert!(reason.contains("95%"));
                assert!(reason.contains("compact"));
            }
            other => panic!("expected Errored, got {other:?}"),
        }
        assert!(host.calls().is_empty());
        assert!(dir.path().join("a4.err").exists());
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn warn_path_writes_warning_and_ack() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        fs::write(dir.path().join(ADVISORY_FILE), "context_pct: 85\npatch: 2\n")
            .await
            .unwrap();
        let artifact = drop_request(&dir, "a5", "sess|send|hello").await;

        let outcome = pipeline(&dir, host.clone()).run(&artifact).await.unwrap();
        assert!(matches!(outcome, Outcome::WarnedAndAcknowledged { .. }));
        assert_eq!(
            host.calls(),
            vec![HostCall::Submit {
                query: "hello".to_string(),
                partial: false,
            }]
        );
        let warn = fs::read_to_string(dir.path().join("a5.warn")).await.unwrap();
        assert!(warn.contains("85%"));
        assert!(dir.path().join("a5.ack").exists());
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn host_failure_becomes_errored_outcome() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        host.fail_on("open_and_submit");
        let artifact = drop_request(&dir, "a6", "sess|send|hello").await;

        let outcome = pipeline(&dir, host.clone()).run(&artifact).await.unwrap();
        match outcome {
            Outcome::Errored { reason } => assert!(reason.contains("open_and_submit")),
            other => panic!("expected Errored, got {other:?}"),
        }
        assert!(dir.path().join("a6.err").exists());
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn vanished_artifact_is_skipped_without_outcome() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        let artifact = dir.path().join("gone.msg");

        let outcome = pipeline(&dir, host.clone()).run(&artifact).await;
        assert!(outcome.is_none());
        assert!(!dir.path().join("gone.ack").exists());
        assert!(!dir.path().join("gone.err").exists());
    }

    #[tokio::test]
    async fn non_utf8_artifact_resolves_to_error() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        let artifact = dir.path().join("a8.msg");
        fs::write(&artifact, [0xff, 0xfe, 0x00, 0x80]).await.unwrap();

        let outcome = pipeline(&dir, host.clone()).run(&artifact).await.unwrap();
        match outcome {
            Outcome::Errored { reason } => assert!(reason.contains("unreadable")),
            other => panic!("expected Errored, got {other:?}"),
        }
        assert!(host.calls().is_empty());
        assert!(dir.path().join("a8.err").exists());
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn message_with_separators_delivered_verbatim() {
        let dir = TempDir::new().unwrap();
        let host = Arc::new(RecordingHost::new());
        let artifact = drop_request(&dir, "a7", "sess|send|a|b|c").await;

        pipeline(&dir, host.clone()).run(&artifact).await.unwrap();
        assert_eq!(
            host.calls(),
            vec![HostCall::Submit {
                query: "a|b|c".to_string(),
                partial: false,
            }]
        );
    }
}
