//! Error types for the relay.

use std::path::PathBuf;

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Request parsing failures.
///
/// Malformed input is always a typed `Err`, never a panic.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed request: expected at least 3 '|'-separated segments, got {segments}")]
    MalformedSegmentCount { segments: usize },

    #[error("Malformed request: empty field(s): {}", .fields.join(", "))]
    EmptyField { fields: Vec<&'static str> },
}

/// Host capability invocation failures.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Host capability {capability} failed: {reason}")]
    CapabilityFailed {
        capability: &'static str,
        reason: String,
    },
}

/// Dispatch-level failures: everything that can stop a request after it
/// parses cleanly but before (or while) the host is invoked.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unknown mode '{mode}'. Supported modes: {supported}")]
    UnknownMode { mode: String, supported: String },

    #[error("Context blocked: {reason}")]
    ContextBlocked { reason: String },

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Artifact I/O failures: write of an outcome file or removal of a request
/// file. Non-fatal by policy, logged and never allowed to abort the watch loop.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to write outcome artifact {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove request artifact {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;
