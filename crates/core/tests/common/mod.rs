#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog_core::clock::ManualClock;
use catalog_core::document::{Category, CategoryDraft, CategoryPatch, ImageFile, Placement};
use catalog_core::events::EventBus;
use catalog_core::mutation::CategoryService;
use catalog_core::store::{
    BlobError, BlobErrorKind, BlobStore, CategoryFilter, DocumentStore, MemoryBlobStore,
    MemoryDocumentStore, StoreError, Subscription,
};
use catalog_core::taxonomy::Taxonomy;

/// One remote call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload(String),
    DeleteBlob(String),
    Create,
    Get(String),
    Update(String),
    DeleteDocument(String),
    List,
    Subscribe,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Blob store that records every call and can be told to fail.
#[derive(Clone)]
pub struct RecordingBlobStore {
    pub inner: MemoryBlobStore,
    log: CallLog,
    failing_deletes: Arc<Mutex<bool>>,
    denied_uploads: Arc<Mutex<bool>>,
}

impl RecordingBlobStore {
    pub fn fail_deletes(&self) {
        *self.failing_deletes.lock().unwrap() = true;
    }

    pub fn deny_uploads(&self) {
        *self.denied_uploads.lock().unwrap() = true;
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn upload(&self, file: &ImageFile, path: &str) -> Result<String, BlobError> {
        self.log.lock().unwrap().push(Call::Upload(path.to_string()));
        if *self.denied_uploads.lock().unwrap() {
            return Err(BlobError::upload(
                BlobErrorKind::PermissionDenied,
                path,
                "permission denied",
            ));
        }
        self.inner.upload(file, path).await
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        self.log
            .lock()
            .unwrap()
            .push(Call::DeleteBlob(path.to_string()));
        if *self.failing_deletes.lock().unwrap() {
            return Err(BlobError::delete(BlobErrorKind::Unknown, path, "network down"));
        }
        self.inner.delete(path).await
    }
}

/// Document store wrapper that records every call.
#[derive(Clone)]
pub struct RecordingDocumentStore {
    pub inner: MemoryDocumentStore,
    log: CallLog,
}

impl RecordingDocumentStore {
    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DocumentStore for RecordingDocumentStore {
    async fn create(&self, draft: CategoryDraft) -> Result<Category, StoreError> {
        self.record(Call::Create);
        self.inner.create(draft).await
    }

    async fn get(&self, id: &str) -> Result<Option<Category>, StoreError> {
        self.record(Call::Get(id.to_string()));
        self.inner.get(id).await
    }

    async fn update(&self, id: &str, patch: CategoryPatch) -> Result<Category, StoreError> {
        self.record(Call::Update(id.to_string()));
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.record(Call::DeleteDocument(id.to_string()));
        self.inner.delete(id).await
    }

    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>, StoreError> {
        self.record(Call::List);
        self.inner.list(filter).await
    }

    async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
        self.record(Call::List);
        self.inner.list_all().await
    }

    async fn subscribe(&self, filter: CategoryFilter) -> Result<Subscription, StoreError> {
        self.record(Call::Subscribe);
        self.inner.subscribe(filter).await
    }
}

pub struct Harness {
    pub service: CategoryService,
    pub blobs: RecordingBlobStore,
    pub documents: RecordingDocumentStore,
    log: CallLog,
}

impl Harness {
    pub fn new() -> Self {
        let log: CallLog = Arc::default();
        let clock = Arc::new(ManualClock::with_step(1_714_557_600_000, 5));
        let blobs = RecordingBlobStore {
            inner: MemoryBlobStore::new("https://blobs.test"),
            log: log.clone(),
            failing_deletes: Arc::default(),
            denied_uploads: Arc::default(),
        };
        let documents = RecordingDocumentStore {
            inner: MemoryDocumentStore::with_clock(EventBus::new(64), clock.clone()),
            log: log.clone(),
        };
        let service = CategoryService::with_clock(
            Arc::new(blobs.clone()),
            Arc::new(documents.clone()),
            Arc::new(Taxonomy::default()),
            clock,
        );
        Self {
            service,
            blobs,
            documents,
            log,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn blob_deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteBlob(path) => Some(path),
                _ => None,
            })
            .collect()
    }
}

pub fn kitchen() -> Placement {
    Placement::new("Modern", "Kitchen", "Small Appliances")
}

pub fn jpeg(name: &str, size: usize) -> ImageFile {
    ImageFile::new(name, "image/jpeg", vec![0xAB; size])
}

pub fn png(name: &str, size: usize) -> ImageFile {
    ImageFile::new(name, "image/png", vec![0x89; size])
}

pub const MB: usize = 1024 * 1024;
