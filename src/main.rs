//! Shopfront - storefront and merchant back office API

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront::config::BackendKind;
use shopfront::services::{EventBus, HttpTransport, MercadoPagoClient};
use shopfront::store::{PgStore, RecordStore};
use shopfront::{api, AppState, ShopConfig, Store};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "shopfront=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ShopConfig::from_env().context("Failed to load configuration")?;
    let store = open_store(&config).await?;
    tracing::info!(backend = store.backend_name(), "Storage ready");

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, domain events disabled");
                None
            }
        },
        None => None,
    };

    let gateway = Arc::new(MercadoPagoClient::new(&config.payments)?);
    let transport = Arc::new(HttpTransport::new(config.webhook_timeout)?);
    let addr = config.socket_addr();
    let events = EventBus::new(nats);
    tracing::info!(enabled = events.is_enabled(), "Domain events");
    let state = AppState::new(config, store, gateway, transport, events);
    let app = api::router(state);

    tracing::info!("Shopfront listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn open_store(config: &ShopConfig) -> Result<Store> {
    match config.backend {
        BackendKind::Postgres => {
            let url = config.database_url.as_ref().context("DATABASE_URL is required for the postgres backend")?;
            let pg = PgStore::connect(url).await.context("Failed to connect to Postgres")?;
            pg.migrate().await.context("Failed to run migrations")?;
            Ok(Store::Postgres(pg))
        }
        BackendKind::Records => Ok(Store::Records(record_store(config)?)),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn record_store(config: &ShopConfig) -> Result<RecordStore> {
    use shopfront::store::RocksDocuments;

    match &config.records_path {
        Some(path) => {
            let documents = RocksDocuments::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(RecordStore::new(Arc::new(documents)))
        }
        None => {
            tracing::warn!("RECORDS_PATH not set, records are kept in memory");
            Ok(RecordStore::in_memory())
        }
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn record_store(config: &ShopConfig) -> Result<RecordStore> {
    if config.records_path.is_some() {
        tracing::warn!("RECORDS_PATH ignored: built without the storage-rocksdb feature");
    }
    tracing::warn!("Records are kept in memory");
    Ok(RecordStore::in_memory())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
