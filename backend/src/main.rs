use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use finance_tracker_backend::{config::Config, create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Non-fatal: env vars can be set externally.
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let app_state = initialize_backend(&config).await?;
    let app = create_router(&config, app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Starting server on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
