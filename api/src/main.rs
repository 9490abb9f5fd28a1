use std::sync::Arc;

use anyhow::Context;
use berth_api::{
    auth::bootstrap::ensure_admin,
    config::{BerthApiConfig, StorageBackend},
    server,
};
use berth_db::storage::{Storage, memory::MemoryStorage, mongodb::MongoDBStorage};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BerthApiConfig::parse();

    if config.dump_openapi {
        let (_, api) = server::make(config, Arc::new(MemoryStorage::new()))?;
        print!("{}", api.to_pretty_json()?);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or("berth_api=info,berth_common=info,berth_db=info".into()),
        )
        .pretty()
        .init();

    let db: Arc<dyn Storage> = match config.storage {
        StorageBackend::Mongodb => Arc::new(
            MongoDBStorage::new(&config.mongodb_uri)
                .await
                .context("Failed to connect to MongoDB")?,
        ),
        StorageBackend::Memory => {
            warn!("Using in-memory storage; nothing will survive a restart");
            Arc::new(MemoryStorage::new())
        }
    };

    if let Some(token) = config.admin_token.as_deref() {
        ensure_admin(&*db, token)
            .await
            .context("Failed to bootstrap the admin user")?;
    }

    let (router, _) = server::make(config.clone(), db.clone())?;

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.shutdown().await?;
    info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
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

    info!("Shutdown signal received, draining connections");
}
