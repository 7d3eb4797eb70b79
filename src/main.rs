use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use badgerbot::config::Config;
use badgerbot::server::{self, AppState};
use badgerbot::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,badgerbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Port: {}", config.server.port);
    info!("  Upstream: {}", config.upstream.base_url);

    // The tunnel is run by an external ngrok process; we only confirm the
    // auth token is readable so a misconfiguration fails at startup.
    if let Some(tunnel) = &config.tunnel {
        let _token = tunnel.read_token().with_context(|| {
            format!("Failed to load tunnel token from {}", tunnel.token_file.display())
        })?;
        info!("  Tunnel token loaded from {}", tunnel.token_file.display());
    }

    let upstream = UpstreamClient::new(config.upstream.clone())?;
    let state = AppState::new(upstream);

    server::run(state, config.server.port).await
}
