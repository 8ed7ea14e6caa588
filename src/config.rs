//! Configuration types.

use std::time::Duration;

/// Relay configuration.
///
/// The settle delays give cancel-class host operations time to take effect
/// before the following submit is issued. Any fixed positive value works;
/// `cancel_settle` must stay longer than `steer_settle`.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// How often the watch loop scans the inbox for new request artifacts.
    pub poll_interval: Duration,
    /// Pause between prefilling input and interrupt-and-submit (steer).
    pub steer_settle: Duration,
    /// Pause between cancelling the current operation and submitting
    /// (stop-and-send).
    pub cancel_settle: Duration,
    /// Pause between prefilling input and enqueueing (queue).
    pub queue_settle: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            steer_settle: Duration::from_millis(150),
            cancel_settle: Duration::from_millis(300),
            queue_settle: Duration::from_millis(150),
        }
    }
}

#[cfg(test)]
impl RelayConfig {
    /// Config with near-zero delays so tests don't sit in sleeps.
    pub fn fast() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            steer_settle: Duration::from_millis(1),
            cancel_settle: Duration::from_millis(1),
            queue_settle: Duration::from_millis(1),
        }
    }
}
