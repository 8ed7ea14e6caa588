//! Host capability surface.
//!
//! The relay never talks to the host application directly. It depends on the
//! five capabilities below, supplied by the surrounding application. Any host
//! offering them satisfies the contract, which is what lets the pipeline be
//! tested against a recording fake.

use async_trait::async_trait;

use crate::error::HostError;

/// Abstract capabilities of the interactive host application.
///
/// Pure I/O, no relay logic. Semantics the relay relies on:
/// `open_and_submit` with `partial = false` submits immediately (the host may
/// silently drop the submit while busy, which is not detectable here); with
/// `partial = true` it only prefills the input. `cancel_current` is a no-op
/// when the host is idle. `show_usage_panel` surfaces the compaction UI but
/// cannot trigger compaction programmatically.
#[async_trait]
pub trait HostCapabilities: Send + Sync {
    /// Open/focus the interactive surface and submit or prefill `query`.
    async fn open_and_submit(&self, query: &str, partial: bool) -> Result<(), HostError>;

    /// Cancel any in-progress host operation.
    async fn cancel_current(&self) -> Result<(), HostError>;

    /// Interrupt a running operation and submit the prefilled input.
    async fn interrupt_and_submit(&self) -> Result<(), HostError>;

    /// Queue the prefilled input for delivery after the current operation.
    async fn enqueue(&self) -> Result<(), HostError>;

    /// Surface the usage/compaction panel.
    async fn show_usage_panel(&self) -> Result<(), HostError>;
}

/// Host that prints every invocation to stdout.
///
/// Stands in for a real host when running the binary locally, the same way a
/// stdin/stdout channel stands in for a real chat surface.
pub struct StdioHost;

impl StdioHost {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdioHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostCapabilities for StdioHost {
    async fn open_and_submit(&self, query: &str, partial: bool) -> Result<(), HostError> {
        if partial {
            println!("[host] prefill: {query}");
        } else {
            println!("[host] submit: {query}");
        }
        Ok(())
    }

    async fn cancel_current(&self) -> Result<(), HostError> {
        println!("[host] cancel current operation");
        Ok(())
    }

    async fn interrupt_and_submit(&self) -> Result<(), HostError> {
        println!("[host] interrupt and submit");
        Ok(())
    }

    async fn enqueue(&self) -> Result<(), HostError> {
        println!("[host] enqueue prefilled input");
        Ok(())
    }

    async fn show_usage_panel(&self) -> Result<(), HostError> {
        println!("[host] show usage panel");
        Ok(())
    }
}
