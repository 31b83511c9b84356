//! Weekly Focus server: loads config, picks a storage backend, serves `/api`.
//!
//! Run from repo root: `cargo run -p weekly-focus-server`
//! Set `DATABASE_URL` for PostgreSQL; without it data lives in memory for the process lifetime.

use std::sync::Arc;
use tokio::net::TcpListener;
use weekly_focus::{
    ensure_database_exists, init_tracing, router, AppState, MemStorage, PgStorage, ServerConfig,
    Storage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let storage: Arc<dyn Storage> = match &config.database_url {
        Some(url) => {
            ensure_database_exists(url).await?;
            let pg = PgStorage::connect(url, config.max_connections).await?;
            tracing::info!("using PostgreSQL storage");
            Arc::new(pg)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory storage");
            Arc::new(MemStorage::new())
        }
    };

    let app = router(AppState::new(storage), &config);
    let listener = TcpListener::bind(config.bind_addr()?).await?;
    tracing::info!("serving on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("shutdown signal received");
}
