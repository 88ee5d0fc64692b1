//! In-process backends. Used for local development and as the default when
//! no database or bucket is configured.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::document::id::new_document_id;
use crate::document::{Category, CategoryDraft, CategoryPatch, ImageFile};
use crate::events::{CategoryEvent, EventBus};

use super::blob::{BlobError, BlobStore};
use super::document::{CategoryFilter, DocumentStore, StoreError};
use super::subscription::Subscription;

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

/// Blob store keeping objects in a map keyed by path.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    base_url: String,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::default(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(path))
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.read().await.contains_key(path)
    }

    pub async fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(path)
            .map(|o| o.content_type.clone())
    }

    pub async fn bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(path).map(|o| o.bytes.clone())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, file: &ImageFile, path: &str) -> Result<String, BlobError> {
        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                content_type: file.content_type.clone(),
                bytes: file.bytes.clone(),
            },
        );
        tracing::debug!(path, size = file.size(), "stored object in memory");
        Ok(self.url_for(path))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        if self.objects.write().await.remove(path).is_none() {
            tracing::debug!(path, "object already absent");
        }
        Ok(())
    }
}

struct DocumentsInner {
    // Insertion order is listing order.
    documents: RwLock<Vec<Category>>,
    bus: EventBus,
    clock: Arc<dyn Clock>,
}

/// Document store backed by a vector, publishing every write on an [`EventBus`].
#[derive(Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<DocumentsInner>,
}

impl MemoryDocumentStore {
    pub fn new(bus: EventBus) -> Self {
        Self::with_clock(bus, Arc::new(SystemClock))
    }

    pub fn with_clock(bus: EventBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(DocumentsInner {
                documents: RwLock::new(Vec::new()),
                bus,
                clock,
            }),
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, draft: CategoryDraft) -> Result<Category, StoreError> {
        let now = self.inner.clock.now();
        let category = Category {
            id: new_document_id(),
            name: draft.name,
            root_category: draft.placement.root_category,
            sub_category: draft.placement.sub_category,
            category_type: draft.placement.category_type,
            featured_image: draft.featured_image,
            image_path: draft.image_path,
            variations: draft.variations,
            created_at: now,
            updated_at: now,
        };
        self.inner.documents.write().await.push(category.clone());
        self.inner.bus.publish(CategoryEvent::created(&category));
        Ok(category)
    }

    async fn get(&self, id: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .inner
            .documents
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn update(&self, id: &str, patch: CategoryPatch) -> Result<Category, StoreError> {
        let (before, updated) = {
            let mut documents = self.inner.documents.write().await;
            let category = documents
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            let before = category.placement();
            patch.apply_to(category);
            category.updated_at = self.inner.clock.now();
            (before, category.clone())
        };
        self.inner
            .bus
            .publish(CategoryEvent::updated(before, &updated));
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut documents = self.inner.documents.write().await;
            let index = documents
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            documents.remove(index)
        };
        self.inner
            .bus
            .publish(CategoryEvent::deleted(
                id,
                removed.placement(),
                self.inner.clock.now(),
            ));
        Ok(())
    }

    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>, StoreError> {
        Ok(self
            .inner
            .documents
            .read()
            .await
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.inner.documents.read().await.clone())
    }

    async fn subscribe(&self, filter: CategoryFilter) -> Result<Subscription, StoreError> {
        let events = self.inner.bus.subscribe();
        Ok(Subscription::spawn(Arc::new(self.clone()), events, filter))
    }
}
