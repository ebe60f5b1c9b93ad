use anyhow::{Context, Result};
use sc_core::ServiceConfig;
use sc_server::{app_with_state, state::AppState};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = ServiceConfig::from_env()?;
    let state = AppState::from_config(&config)
        .await
        .with_context(|| format!("failed to open ledger at {}", config.ledger.stats_path.display()))?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, model = %config.oracle.model, "sc-server listening");

    axum::serve(listener, app_with_state(state)).await?;
    Ok(())
}
