//! Outcome resolution: exactly one terminal artifact set per request.
//!
//! Resolution always pairs the outcome write with exactly one attempt to
//! remove the request artifact. The two are independent best-effort
//! operations; a failure in either is logged and swallowed so the watch
//! loop is never aborted by artifact I/O.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::error::ArtifactError;

/// Extension of inbound request artifacts.
pub const REQUEST_EXT: &str = "msg";
/// Extension of acknowledgement artifacts.
pub const ACK_EXT: &str = "ack";
/// Extension of error artifacts.
pub const ERR_EXT: &str = "err";
/// Extension of warning artifacts.
pub const WARN_EXT: &str = "warn";

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Acknowledged { note: String },
    WarnedAndAcknowledged { warning: String, note: String },
    Errored { reason: String },
}

impl Outcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Acknowledged { .. } => "acknowledged",
            Self::WarnedAndAcknowledged { .. } => "warned",
            Self::Errored { .. } => "errored",
        }
    }
}

fn artifact_path(inbox: &Path, id: &str, ext: &str) -> PathBuf {
    inbox.join(format!("{id}.{ext}"))
}

/// Write one outcome artifact. Result-returning so the swallow policy is
/// testable; callers inside the pipeline log and continue.
pub async fn write_artifact(
    inbox: &Path,
    id: &str,
    ext: &str,
    content: &str,
) -> Result<(), ArtifactError> {
    let path = artifact_path(inbox, id, ext);
    fs::write(&path, content)
        .await
        .map_err(|source| ArtifactError::Write { path, source })
}

/// Remove the originating request artifact.
pub async fn remove_request(inbox: &Path, id: &str) -> Result<(), ArtifactError> {
    let path = artifact_path(inbox, id, REQUEST_EXT);
    fs::remove_file(&path)
        .await
        .map_err(|source| ArtifactError::Remove { path, source })
}

/// Resolve a pipeline run: write the outcome artifact(s) and remove the
/// request artifact. Never returns an error and never panics.
pub async fn resolve(inbox: &Path, id: &str, outcome: &Outcome) {
    let writes: Vec<(&str, &str)> = match outcome {
        Outcome::Acknowledged { note } => vec![(ACK_EXT, note.as_str())],
        Outcome::WarnedAndAcknowledged { warning, note } => {
            vec![(WARN_EXT, warning.as_str()), (ACK_EXT, note.as_str())]
        }
        Outcome::Errored { reason } => vec![(ERR_EXT, reason.as_str())],
    };

    for (ext, content) in writes {
        if let Err(e) = write_artifact(inbox, id, ext, content).await {
            warn!(id, error = %e, "Outcome artifact write failed");
        }
    }

    // Attempted regardless of how the writes went.
    if let Err(e) = remove_request(inbox, id).await {
        warn!(id, error = %e, "Request artifact removal failed");
    }

    info!(id, outcome = outcome.label(), "Request resolved");
}
