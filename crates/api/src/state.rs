use std::sync::Arc;

use catalog_core::events::EventBus;
use catalog_core::mutation::CategoryService;
use catalog_core::store::MemoryBlobStore;
use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    service: CategoryService,
    config: AppConfig,
    event_bus: EventBus,
    /// Present only with the Postgres document store.
    pool: Option<PgPool>,
    /// Present only with the in-memory blob store, which we serve ourselves.
    memory_blobs: Option<MemoryBlobStore>,
}

impl AppState {
    pub fn new(
        service: CategoryService,
        config: AppConfig,
        event_bus: EventBus,
        pool: Option<PgPool>,
        memory_blobs: Option<MemoryBlobStore>,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                service,
                config,
                event_bus,
                pool,
                memory_blobs,
            }),
        }
    }

    pub fn service(&self) -> &CategoryService {
        &self.inner.service
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    pub fn memory_blobs(&self) -> Option<&MemoryBlobStore> {
        self.inner.memory_blobs.as_ref()
    }
}
