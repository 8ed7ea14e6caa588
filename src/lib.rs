//! agent-relay: file-based message relay into an interactive chat host.

pub mod advisory;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod outcome;
pub mod parser;
pub mod pipeline;
pub mod watcher;
