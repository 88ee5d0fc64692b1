use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::document::{Category, CategoryDraft, CategoryPatch, Placement, TaxonomyKey};

use super::subscription::Subscription;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(format!("malformed document: {err}"))
    }
}

/// Equality query on root and sub, optionally narrowed by type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct CategoryFilter {
    #[serde(rename = "root")]
    pub root_category: String,
    #[serde(rename = "sub")]
    pub sub_category: String,
    #[serde(default, rename = "type")]
    pub category_type: Option<String>,
}

impl CategoryFilter {
    pub fn new(root_category: impl Into<String>, sub_category: impl Into<String>) -> Self {
        Self {
            root_category: root_category.into(),
            sub_category: sub_category.into(),
            category_type: None,
        }
    }

    pub fn with_type(mut self, category_type: impl Into<String>) -> Self {
        self.category_type = Some(category_type.into());
        self
    }

    pub fn for_key(key: &TaxonomyKey) -> Self {
        Self::new(&key.root_category, &key.sub_category)
    }

    pub fn key(&self) -> TaxonomyKey {
        TaxonomyKey::new(&self.root_category, &self.sub_category)
    }

    pub fn matches_placement(&self, placement: &Placement) -> bool {
        placement.root_category == self.root_category
            && placement.sub_category == self.sub_category
            && self
                .category_type
                .as_ref()
                .map_or(true, |t| *t == placement.category_type)
    }

    pub fn matches(&self, category: &Category) -> bool {
        category.root_category == self.root_category
            && category.sub_category == self.sub_category
            && self
                .category_type
                .as_ref()
                .map_or(true, |t| *t == category.category_type)
    }
}

/// Structured-record storage for the `categories` collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. The store assigns `id`, `createdAt` and `updatedAt`.
    async fn create(&self, draft: CategoryDraft) -> Result<Category, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Category>, StoreError>;

    /// Merge `patch` into the stored document and refresh `updatedAt`.
    async fn update(&self, id: &str, patch: CategoryPatch) -> Result<Category, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Category>, StoreError>;

    /// Open a live query. The first message is the current snapshot.
    async fn subscribe(&self, filter: CategoryFilter) -> Result<Subscription, StoreError>;
}
