//! taskdeck command-line client.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskdeck_client::{Client, HttpTransport, HttpTransportConfig};

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_writer(std::io::stderr)
            .init();
    }

    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: args.url.clone(),
        timeout: Duration::from_secs(args.timeout),
        ..Default::default()
    })?;
    let client = Client::new(transport);

    commands::execute(&client, args.command).await
}
