//! Detectify - people detection web client
//!
//! Serves the upload, history and detail pages and forwards work to the
//! detection REST backend.

mod api;
mod config;
mod views;
mod web;

#[cfg(test)]
mod test_support;

use config::ServerConfig;
use web::Server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("detectify=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting Detectify on port {}...", cfg.http_port);
    tracing::info!("Using detection API at {}", cfg.api_url);

    let server = Server::new(cfg)?;
    server.start().await?;

    Ok(())
}
