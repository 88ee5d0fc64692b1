mod config;
mod error;
mod middleware;
mod routes;
mod state;

use std::sync::Arc;

use catalog_core::events::EventBus;
use catalog_core::mutation::CategoryService;
use catalog_core::store::{
    BlobStore, DocumentStore, MemoryBlobStore, MemoryDocumentStore, PgDocumentStore, S3BlobStore,
};
use catalog_core::taxonomy::Taxonomy;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, BlobBackend, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config =
        AppConfig::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!("Starting catalog API server");

    let taxonomy = match &config.taxonomy_path {
        Some(path) => {
            let taxonomy = Taxonomy::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load taxonomy {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded taxonomy");
            taxonomy
        }
        None => Taxonomy::default(),
    };

    let event_bus = EventBus::new(config.event_bus_capacity);
    let (documents, pool) = document_store(&config, event_bus.clone()).await?;
    let (blobs, memory_blobs) = blob_store(&config)?;

    let service = CategoryService::new(blobs, documents, Arc::new(taxonomy));
    let state = state::AppState::new(service, config.clone(), event_bus, pool, memory_blobs);

    let app = routes::build_router(state)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer(&config.cors_origins));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn document_store(
    config: &AppConfig,
    bus: EventBus,
) -> anyhow::Result<(Arc<dyn DocumentStore>, Option<PgPool>)> {
    match &config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory document store; data is lost on restart");
            Ok((Arc::new(MemoryDocumentStore::new(bus)), None))
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
            min_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .min_connections(*min_connections)
                .connect(database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;
            tracing::info!("Connected to PostgreSQL");

            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
            tracing::info!("Database migrations applied");

            Ok((Arc::new(PgDocumentStore::new(pool.clone(), bus)), Some(pool)))
        }
    }
}

fn blob_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn BlobStore>, Option<MemoryBlobStore>)> {
    match &config.blobs {
        BlobBackend::Memory { public_base_url } => {
            tracing::warn!(%public_base_url, "using in-memory blob store");
            let blobs = MemoryBlobStore::new(public_base_url.clone());
            Ok((Arc::new(blobs.clone()), Some(blobs)))
        }
        BlobBackend::S3(s3) => {
            let blobs = S3BlobStore::new(s3.clone())
                .map_err(|e| anyhow::anyhow!("Failed to configure S3 storage: {e}"))?;
            tracing::info!(bucket = %s3.bucket, endpoint = %s3.endpoint, "using S3 blob store");
            Ok((Arc::new(blobs), None))
        }
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
