use anyhow::Result;
use api::{AppState, create_router};
use common::{
    AppConfig,
    database::{health_check, init_pool, init_schema},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting SoundWave API service");

    let config = AppConfig::load()?;

    // Initialize database connection pool
    let pool = init_pool(&config.database()).await?;

    // Check database connectivity
    if health_check(&pool).await {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    init_schema(&pool).await?;

    tokio::fs::create_dir_all(&config.storage_root).await?;
    tokio::fs::create_dir_all(&config.upload_folder).await?;

    let bind_address = config.bind_address.clone();
    let app = create_router(AppState::new(config, pool));

    let listener = TcpListener::bind(&bind_address).await?;
    info!("API service listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
