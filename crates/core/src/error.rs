use thiserror::Error;

use crate::document::validate::ValidationError;
use crate::store::{BlobError, StoreError};

/// Errors raised by the mutation service and the view-state controller.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("category not found: {0}")]
    NotFound(String),

    #[error("variation {variation_id} not found in category {category_id}")]
    VariationNotFound {
        category_id: String,
        variation_id: String,
    },

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error("document store error: {0}")]
    Backend(String),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CatalogError::NotFound(id),
            StoreError::Backend(msg) => CatalogError::Backend(msg),
        }
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
