use std::sync::Arc;

use anyhow::Context;
use tenant_notes::config::AppConfig;
use tenant_notes::database::{schema, seed, DatabaseManager, MemoryStore, PgStore, Store};
use tenant_notes::routes::{self, AppState};
use tenant_notes::services::Pipeline;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tenant_notes=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting tenant-notes in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match config.database.url {
        Some(_) => {
            let manager = DatabaseManager::connect(&config.database).await?;
            schema::run_migrations(manager.pool()).await?;
            Arc::new(PgStore::new(manager.pool().clone()))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let pipeline = Arc::new(
        Pipeline::from_config(store.clone(), &config).context("failed to build request pipeline")?,
    );

    if config.api.seed_demo_data {
        let passwords = tenant_notes::auth::PasswordService::from_config(&config.security)?;
        let tenants = seed::seed_demo_data(store.as_ref(), &passwords).await?;
        tracing::info!(tenants = tenants.len(), "Demo data ready");
    }

    let app = routes::router(AppState::new(pipeline), &config.security);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
