//! Dispatch strategy table: one fixed host invocation sequence per mode.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use tokio::time::sleep;
use tracing::debug;

use crate::config::RelayConfig;
use crate::error::DispatchError;
use crate::host::HostCapabilities;
use crate::parser::Request;

/// Delivery mode requested by the caller.
///
/// Matched exhaustively in [`dispatch`], so adding a mode is a
/// compile-checked extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Submit immediately. Delivered only if the host is idle; a busy host
    /// may silently drop the submit, which is accepted behavior.
    Send,
    /// Prefill, settle, then interrupt the running operation and submit.
    Steer,
    /// Cancel the current operation, settle, then submit. Guaranteed-cancel
    /// semantics, as opposed to steer's best-effort interrupt.
    StopAndSend,
    /// Prefill, settle, then queue for delivery after the current operation.
    Queue,
    /// Surface the usage/compaction panel. Opening the panel is all the host
    /// capability surface allows; compaction itself is not triggered.
    Compact,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Send,
        Mode::Steer,
        Mode::StopAndSend,
        Mode::Queue,
        Mode::Compact,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Send => "send",
            Mode::Steer => "steer",
            Mode::StopAndSend => "stop-and-send",
            Mode::Queue => "queue",
            Mode::Compact => "compact",
        }
    }

    /// Comma-separated list of every supported mode, for error messages.
    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(Mode::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send" => Ok(Mode::Send),
            "steer" => Ok(Mode::Steer),
            "stop-and-send" => Ok(Mode::StopAndSend),
            "queue" => Ok(Mode::Queue),
            "compact" => Ok(Mode::Compact),
            other => Err(DispatchError::UnknownMode {
                mode: other.to_string(),
                supported: Mode::supported(),
            }),
        }
    }
}

/// Execute the mode's invocation sequence against the host.
///
/// Returns the acknowledgement note on success. A failed capability call
/// terminates the sequence and maps to [`DispatchError::Host`].
pub async fn dispatch(
    mode: Mode,
    request: &Request,
    host: &dyn HostCapabilities,
    config: &RelayConfig,
) -> Result<String, DispatchError> {
    debug!(
        mode = %mode,
        session = request.short_session_id(),
        "Dispatching request"
    );

    match mode {
        Mode::Send => {
            host.open_and_submit(&request.message, false).await?;
        }
        Mode::Steer => {
            host.open_and_submit(&request.message, true).await?;
            sleep(config.steer_settle).await;
            host.interrupt_and_submit().await?;
        }
        Mode::StopAndSend => {
            host.cancel_current().await?;
            sleep(config.cancel_settle).await;
            host.open_and_submit(&request.message, false).await?;
        }
        Mode::Queue => {
            host.open_and_submit(&request.message, true).await?;
            sleep(config.queue_settle).await;
            host.enqueue().await?;
        }
        Mode::Compact => {
            host.show_usage_panel().await?;
            return Ok(format!(
                "usage panel opened for session {} at {} (compaction itself must \
                 be confirmed in the host)",
                request.short_session_id(),
                Utc::now().to_rfc3339(),
            ));
        }
    }

    Ok(format!(
        "{} delivered for session {} at {}",
        mode,
        request.short_session_id(),
        Utc::now().to_rfc3339(),
    ))
}
