//! slircbot - Straylight IRC bot
//!
//! Trigger commands, vetoable announcements and link titles on top of the
//! slirc-client engine.

mod bot;
mod config;
mod triggers;
mod urls;

use crate::bot::Bot;
use crate::config::AppConfig;
use slirc_client::Client;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = AppConfig::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.irc.server.host,
        port = config.irc.server.port,
        tls = config.irc.server.tls,
        nick = %config.irc.identity.nick,
        "Starting slircbot"
    );

    let client = Client::new(config.irc);
    let irc = client.irc();
    Arc::new(Bot::new(config.bot)?).install(&irc);

    let shutdown = irc.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            shutdown.quit(Some("Shutting down"));
        }
    });

    client.connect().await;
    info!("slircbot stopped");
    Ok(())
}
