//! Paintgrid - game server with static frontend.

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,server=debug")),
        )
        .init();

    // Load configuration
    let config = server::Config::load()?;

    let separator = "═".repeat(50);
    info!("{}", separator);
    info!("Paintgrid Server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Listening on port: {}", config.server.port);
    info!("  Static files: {}", config.server.web_root.display());
    info!(
        "  Round: {}s, tick every {}ms",
        config.game.round_seconds, config.game.tick_interval_ms
    );
    info!("{}", separator);

    server::run(config).await?;

    Ok(())
}
