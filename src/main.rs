use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use quotes_recommender::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, CsvLikesStore, LikesStore, PgLikesStore},
    services::build_from_store,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    // Bad thresholds fail here, before any data is read
    let mining = config.mining()?;

    let store: Arc<dyn LikesStore> = match &config.users_csv_path {
        Some(users_path) => Arc::new(
            CsvLikesStore::open(users_path, config.quotes_csv_path.as_ref().map(PathBuf::from))
                .await
                .context("Failed to open CSV snapshot")?,
        ),
        None => {
            let pool = create_pool(&config.database_url).await?;
            let store = PgLikesStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
    };
    tracing::info!(store = store.name(), "Likes store ready");

    let initial = build_from_store(store.as_ref(), mining, config.validate_catalog)
        .await
        .context("Failed to build initial rule set")?;

    let state = AppState::new(store, initial, mining).with_catalog_validation(config.validate_catalog);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
