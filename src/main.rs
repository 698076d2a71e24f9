use anyhow::Context;
use tracing_subscriber::EnvFilter;

use feteer_orders::config;
use feteer_orders::database::DatabaseManager;
use feteer_orders::services::seed_admin;
use feteer_orders::{is_production, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting Feteer Orders API in {:?} mode", config.environment);
    if is_production!() && config.security.admin_password.is_some() {
        tracing::warn!("ADMIN_PASSWORD is set in production; unset it once the admin account exists");
    }

    let store = DatabaseManager::connect_and_migrate(&config.database)
        .await
        .context("failed to open the order store")?;

    if let Some(admin) = seed_admin(store.as_ref(), &config.security).await? {
        tracing::info!("Seeded admin account '{}'", admin.username);
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(store, config).context("JWT_SECRET must be set")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Feteer Orders API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
