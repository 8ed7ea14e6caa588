//! Context advisory: optional, externally-written host load status.
//!
//! A `context.probe` file in the inbox describes how loaded the host is.
//! It is read fresh before every dispatch (no caching across requests) and
//! its absence is never an error. The advisory only *advises*, except for
//! the steering mode, where a near-full context forces a block.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::dispatch::Mode;

/// Fixed name of the advisory artifact inside the inbox directory.
pub const ADVISORY_FILE: &str = "context.probe";

/// Context percentage above which steering is blocked outright.
const BLOCK_THRESHOLD_PCT: f64 = 95.0;

/// Context percentage above which every mode gets a warning.
const WARN_THRESHOLD_PCT: f64 = 80.0;

/// Snapshot of the host's load, as written by an external observer.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextAdvisory {
    /// Free-form status label ("idle", "running", ...).
    pub state: String,
    /// Context window usage in percent.
    pub context_pct: f64,
    /// Number of pending patches.
    pub patch_count: u32,
    /// Number of tracked resources.
    pub resource_count: u32,
}

impl Default for ContextAdvisory {
    fn default() -> Self {
        Self {
            state: "unknown".to_string(),
            context_pct: 0.0,
            patch_count: 0,
            resource_count: 0,
        }
    }
}

/// Policy decision derived from the advisory for a given mode.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryDecision {
    Proceed,
    WarnAndProceed { warning: String },
    Block { reason: String },
}

/// Load the advisory from the inbox directory.
///
/// Returns `None` if the file is missing or unreadable. Each field degrades
/// independently: a numeric key that fails to parse becomes 0, a missing
/// `state` stays "unknown". A malformed file never raises an error.
pub async fn load(inbox: &Path) -> Option<ContextAdvisory> {
    let path = inbox.join(ADVISORY_FILE);
    let content = match fs::read_to_string(&path).await {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No readable advisory");
            return None;
        }
    };
    Some(parse(&content))
}

/// Parse line-oriented `key: value` advisory text.
fn parse(content: &str) -> ContextAdvisory {
    let mut advisory = ContextAdvisory::default();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "state" if !value.is_empty() => advisory.state = value.to_string(),
            "context_pct" => advisory.context_pct = value.parse().unwrap_or(0.0),
            "patch" => advisory.patch_count = value.parse().unwrap_or(0),
            "rsc" => advisory.resource_count = value.parse().unwrap_or(0),
            // "ts" and anything else: ignored.
            _ => {}
        }
    }
    advisory
}

/// Evaluate the advisory against the requested mode.
///
/// Runs once per request, after parsing and before any host invocation.
pub fn evaluate(advisory: Option<&ContextAdvisory>, mode: Mode) -> AdvisoryDecision {
    let Some(advisory) = advisory else {
        return AdvisoryDecision::Proceed;
    };

    if advisory.context_pct > BLOCK_THRESHOLD_PCT && mode == Mode::Steer {
        return AdvisoryDecision::Block {
            reason: format!(
                "context at {:.0}% exceeds the {:.0}% steering limit; \
                 open the compaction panel (mode=compact) before steering",
                advisory.context_pct, BLOCK_THRESHOLD_PCT
            ),
        };
    }

    if advisory.context_pct > WARN_THRESHOLD_PCT {
        return AdvisoryDecision::WarnAndProceed {
            warning: format!(
                "context at {:.0}% with {} pending patch(es); delivery may be degraded",
                advisory.context_pct, advisory.patch_count
            ),
        };
    }

    AdvisoryDecision::Proceed
}
