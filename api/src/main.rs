use anyhow::Result;
use api::{load_panel, router, AppState};
use shared::{Config, HttpMarketData};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        "Starting CoinScope v{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let config = Config::from_env()?;
    let source = HttpMarketData::new(&config)?;
    let panel = load_panel(&config.price_panel_csv);
    let bind_addr = config.bind_addr.clone();

    let state = Arc::new(AppState::new(config, Arc::new(source), panel));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Dashboard listening on http://{}/dashboard", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
