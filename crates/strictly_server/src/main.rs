//! Strictly Mastermind - game server binary.

use anyhow::{Context, Result};
use clap::Parser;
use strictly_mastermind::RandomNaming;
use strictly_server::{Cli, Server, ServerConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?
        .with_env()
        .with_overrides(cli.host, cli.port, cli.disconnect_policy);

    info!(
        host = %config.host(),
        port = config.port(),
        policy = %config.disconnect_policy(),
        "Starting Strictly Mastermind server"
    );

    let server = Server::bind(&config, Box::new(RandomNaming))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host(), config.port()))?;
    info!("Server ready at ws://{}/", server.local_addr()?);

    server.run().await?;
    Ok(())
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_server=debug,strictly_mastermind=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
