//! Composite category/variation operations.
//!
//! Each operation is a short linear pipeline: validate, read, touch the blob
//! store, then write the document last. Nothing runs concurrently inside one
//! operation, and nothing serialises two operations against each other: the
//! variations array is rewritten read-modify-write, last writer wins.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::document::id::{iso_timestamp, variation_id};
use crate::document::path::{category_image_path, variation_image_path};
use crate::document::validate::{validate_image, validate_name, ValidationError};
use crate::document::{Category, CategoryDraft, CategoryPatch, ImageFile, ImageRef, Variation};
use crate::error::{CatalogError, Result};
use crate::store::{BlobStore, CategoryFilter, DocumentStore, Subscription};
use crate::taxonomy::Taxonomy;

use super::types::{CatalogStats, CategoryUpdate, NewCategory, NewVariation, VariationUpdate};

#[derive(Clone)]
pub struct CategoryService {
    blobs: Arc<dyn BlobStore>,
    documents: Arc<dyn DocumentStore>,
    taxonomy: Arc<Taxonomy>,
    clock: Arc<dyn Clock>,
}

impl CategoryService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
        taxonomy: Arc<Taxonomy>,
    ) -> Self {
        Self::with_clock(blobs, documents, taxonomy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
        taxonomy: Arc<Taxonomy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            blobs,
            documents,
            taxonomy,
            clock,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub async fn get_category(&self, id: &str) -> Result<Category> {
        self.documents
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        Ok(self.documents.list(filter).await?)
    }

    pub async fn subscribe(&self, filter: CategoryFilter) -> Result<Subscription> {
        Ok(self.documents.subscribe(filter).await?)
    }

    pub async fn add_category(&self, input: NewCategory) -> Result<Category> {
        let name = validate_name(&input.name)?;
        self.taxonomy.validate_placement(&input.placement)?;
        let file = require_image(input.image.as_ref())?;

        let image_path =
            category_image_path(&input.placement, &name, self.clock.now(), &file.file_name);
        let featured_image = self.blobs.upload(file, &image_path).await?;

        let category = self
            .documents
            .create(CategoryDraft {
                name,
                placement: input.placement,
                featured_image,
                image_path,
                variations: Vec::new(),
            })
            .await?;

        tracing::info!(
            category_id = %category.id,
            name = %category.name,
            "category added"
        );
        Ok(category)
    }

    pub async fn update_category(&self, id: &str, input: CategoryUpdate) -> Result<Category> {
        let name = validate_name(&input.name)?;
        self.taxonomy.validate_placement(&input.placement)?;
        if let ImageRef::Uploaded(file) = &input.image {
            validate_image(file)?;
        }

        let existing = self.get_category(id).await?;

        let mut patch = CategoryPatch {
            name: Some(name.clone()),
            placement: Some(input.placement.clone()),
            ..Default::default()
        };
        match &input.image {
            ImageRef::Uploaded(file) => {
                self.delete_quietly(&existing.image_path).await;
                let image_path =
                    category_image_path(&input.placement, &name, self.clock.now(), &file.file_name);
                let url = self.blobs.upload(file, &image_path).await?;
                patch.featured_image = Some(url);
                patch.image_path = Some(image_path);
            }
            ImageRef::Persisted { .. } => {}
        }

        let category = self.documents.update(id, patch).await?;
        tracing::info!(category_id = %id, "category updated");
        Ok(category)
    }

    /// Delete every variation image, then the featured image, then the
    /// document. Blob failures are logged and never block the document delete.
    pub async fn delete_category(&self, id: &str) -> Result<Category> {
        let category = self.get_category(id).await?;

        for variation in &category.variations {
            self.delete_quietly(&variation.image_path).await;
        }
        self.delete_quietly(&category.image_path).await;

        self.documents.delete(id).await?;
        tracing::info!(
            category_id = %id,
            variations = category.variations.len(),
            "category deleted"
        );
        Ok(category)
    }

    pub async fn add_variation(&self, category_id: &str, input: NewVariation) -> Result<Variation> {
        let name = validate_name(&input.name)?;
        self.taxonomy.validate_placement(&input.placement)?;
        let file = require_image(input.image.as_ref())?;

        let parent = self.get_category(category_id).await?;

        let now = self.clock.now();
        let image_path =
            variation_image_path(&input.placement, category_id, &name, now, &file.file_name);
        let image = self.blobs.upload(file, &image_path).await?;

        let timestamp = iso_timestamp(now);
        let variation = Variation {
            id: variation_id(now),
            name,
            image,
            image_path,
            category_type: parent.category_type.clone(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        };

        let mut variations = parent.variations;
        variations.push(variation.clone());
        self.write_variations(category_id, variations).await?;

        tracing::info!(
            category_id,
            variation_id = %variation.id,
            "variation added"
        );
        Ok(variation)
    }

    pub async fn update_variation(
        &self,
        category_id: &str,
        variation_id: &str,
        input: VariationUpdate,
    ) -> Result<Variation> {
        let name = validate_name(&input.name)?;
        self.taxonomy.validate_placement(&input.placement)?;
        if let ImageRef::Uploaded(file) = &input.image {
            validate_image(file)?;
        }

        let parent = self.get_category(category_id).await?;
        let mut variations = parent.variations;
        let index = variations
            .iter()
            .position(|v| v.id == variation_id)
            .ok_or_else(|| CatalogError::VariationNotFound {
                category_id: category_id.to_string(),
                variation_id: variation_id.to_string(),
            })?;
        let previous = &variations[index];

        let now = self.clock.now();
        let (image, image_path) = match &input.image {
            ImageRef::Uploaded(file) => {
                self.delete_quietly(&previous.image_path).await;
                let path =
                    variation_image_path(&input.placement, category_id, &name, now, &file.file_name);
                let url = self.blobs.upload(file, &path).await?;
                (url, path)
            }
            ImageRef::Persisted { .. } => (previous.image.clone(), previous.image_path.clone()),
        };

        let rebuilt = Variation {
            id: previous.id.clone(),
            name,
            image,
            image_path,
            category_type: parent.category_type,
            created_at: previous.created_at.clone(),
            updated_at: iso_timestamp(now),
        };
        variations[index] = rebuilt.clone();
        self.write_variations(category_id, variations).await?;

        tracing::info!(category_id, variation_id, "variation updated");
        Ok(rebuilt)
    }

    /// Remove `variation` from its parent. The blob delete is best-effort.
    pub async fn delete_variation(&self, category_id: &str, variation: &Variation) -> Result<()> {
        let parent = self.get_category(category_id).await?;

        self.delete_quietly(&variation.image_path).await;

        let remaining: Vec<Variation> = parent
            .variations
            .into_iter()
            .filter(|v| v.id != variation.id)
            .collect();
        self.write_variations(category_id, remaining).await?;

        tracing::info!(category_id, variation_id = %variation.id, "variation deleted");
        Ok(())
    }

    /// Resolve the stored variation by id, then delete it.
    pub async fn delete_variation_by_id(
        &self,
        category_id: &str,
        variation_id: &str,
    ) -> Result<Variation> {
        let parent = self.get_category(category_id).await?;
        let variation = parent.variation(variation_id).cloned().ok_or_else(|| {
            CatalogError::VariationNotFound {
                category_id: category_id.to_string(),
                variation_id: variation_id.to_string(),
            }
        })?;
        self.delete_variation(category_id, &variation).await?;
        Ok(variation)
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        let categories = self.documents.list_all().await?;
        let total_variations: usize = categories.iter().map(|c| c.variations.len()).sum();
        Ok(CatalogStats {
            root_categories: self.taxonomy.roots().len(),
            sub_categories: self.taxonomy.subs().len(),
            total_categories: categories.len(),
            total_variations,
            total_images: categories.len() + total_variations,
        })
    }

    async fn write_variations(&self, category_id: &str, variations: Vec<Variation>) -> Result<()> {
        self.documents
            .update(
                category_id,
                CategoryPatch {
                    variations: Some(variations),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    async fn delete_quietly(&self, path: &str) {
        if path.is_empty() {
            return;
        }
        if let Err(err) = self.blobs.delete(path).await {
            tracing::warn!(error = %err, path, "failed to delete image, continuing");
        }
    }
}

fn require_image(image: Option<&ImageFile>) -> Result<&ImageFile> {
    let file = image.ok_or(ValidationError::MissingImage)?;
    validate_image(file)?;
    Ok(file)
}
