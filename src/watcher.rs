//! Inbox watch loop.
//!
//! Polls the inbox directory and hands every new `*.msg` artifact to an
//! independently spawned pipeline run. No ordering guarantee is made between
//! artifacts created close together, and one run failing or hanging never
//! blocks another. Runs are not cancelled; a run started before `stop()`
//! completes on its own task.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::host::HostCapabilities;
use crate::outcome::REQUEST_EXT;
use crate::pipeline::Pipeline;

/// Handle owning the watch loop. Explicit lifecycle, no process-wide state.
pub struct RelayHandle {
    task: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

impl RelayHandle {
    /// Signal shutdown and wait for the poll loop to exit.
    pub async fn stop(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.task.await;
    }
}

/// Spawn the watch loop over `inbox`.
///
/// Every detected request artifact runs the pipeline exactly once on its own
/// task. An in-flight name set prevents re-dispatch of an artifact that is
/// still being processed across poll ticks; once an artifact is resolved and
/// removed, reuse of its name is a fresh request.
pub fn spawn_relay(
    inbox: PathBuf,
    host: Arc<dyn HostCapabilities>,
    config: RelayConfig,
) -> RelayHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);
    let poll_interval = config.poll_interval;
    let pipeline = Arc::new(Pipeline::new(inbox.clone(), host, config));
    let in_flight: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

    let task = tokio::spawn(async move {
        info!(
            inbox = %inbox.display(),
            poll_ms = poll_interval.as_millis() as u64,
            "Relay watch loop started"
        );

        let mut tick = tokio::time::interval(poll_interval);

        loop {
            tick.tick().await;

            if shutdown_flag.load(Ordering::Relaxed) {
                info!("Relay watch loop shutting down");
                return;
            }

            scan_once(&inbox, &pipeline, &in_flight).await;
        }
    });

    RelayHandle { task, shutdown }
}

/// One poll cycle: pick up every request artifact not already in flight.
async fn scan_once(
    inbox: &Path,
    pipeline: &Arc<Pipeline>,
    in_flight: &Arc<Mutex<HashSet<String>>>,
) {
    let mut read_dir = match tokio::fs::read_dir(inbox).await {
        Ok(rd) => rd,
        Err(e) => {
            warn!(inbox = %inbox.display(), error = %e, "Inbox scan failed");
            return;
        }
    };

    loop {
        let entry = match read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Inbox entry read failed");
                return;
            }
        };

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(REQUEST_EXT) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };

        // insert() is false while a run for this name is still in flight.
        if !in_flight.lock().unwrap().insert(name.clone()) {
            continue;
        }

        debug!(artifact = %name, "New request artifact detected");
        let pipeline = Arc::clone(pipeline);
        let in_flight = Arc::clone(in_flight);
        tokio::spawn(async move {
            pipeline.run(&path).await;
            in_flight.lock().unwrap().remove(&name);
        });
    }
}
