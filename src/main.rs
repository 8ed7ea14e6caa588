use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agent_relay::config::RelayConfig;
use agent_relay::host::StdioHost;
use agent_relay::watcher::spawn_relay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let inbox = std::env::var("AGENT_RELAY_INBOX")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".agent-relay/inbox")
        });

    let poll_ms: u64 = std::env::var("AGENT_RELAY_POLL_MS")
        .unwrap_or_else(|_| "250".to_string())
        .parse()
        .unwrap_or(250);

    let config = RelayConfig {
        poll_interval: Duration::from_millis(poll_ms),
        ..RelayConfig::default()
    };

    // Directory bootstrapping lives here, outside the core.
    tokio::fs::create_dir_all(&inbox).await?;

    eprintln!("📬 agent-relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Inbox: {}", inbox.display());
    eprintln!("   Poll: every {}ms", poll_ms);
    eprintln!("   Drop '{{id}}.msg' files ('sessionId|mode|message') to deliver.");
    eprintln!("   Ctrl-C to exit.\n");

    let handle = spawn_relay(inbox, Arc::new(StdioHost::new()), config);

    tokio::signal::ctrl_c().await?;
    eprintln!("\nShutting down...");
    handle.stop().await;

    Ok(())
}
