//! taskdeck-server binary.

use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskdeck_server::upstream::UpstreamClient;
use taskdeck_server::{runtime, ServerConfig, TaskdeckService};

/// Per-request timeout against the upstream REST API.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log)?)
        .with_writer(std::io::stderr)
        .init();

    let upstream = UpstreamClient::new(config.upstream_url.clone(), UPSTREAM_TIMEOUT)?;
    let service = TaskdeckService::new(upstream);

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            signal_token.cancel();
        }
    });

    runtime::run(service, config.transport, config.bind, token).await?;
    Ok(())
}
