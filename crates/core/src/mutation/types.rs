/// Inputs accepted by the category mutation service.
use serde::Serialize;

use crate::document::{ImageFile, ImageRef, Placement};

/// Form payload for a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub placement: Placement,
    pub name: String,
    pub image: Option<ImageFile>,
}

/// Edit of an existing category.
///
/// `image` is `Uploaded` when the operator picked a replacement file and
/// `Persisted` when the current image is kept.
#[derive(Debug, Clone)]
pub struct CategoryUpdate {
    pub placement: Placement,
    pub name: String,
    pub image: ImageRef,
}

/// Form payload for a new variation.
#[derive(Debug, Clone)]
pub struct NewVariation {
    pub placement: Placement,
    pub name: String,
    pub image: Option<ImageFile>,
}

/// Edit of an existing variation. Same image semantics as [`CategoryUpdate`].
#[derive(Debug, Clone)]
pub struct VariationUpdate {
    pub placement: Placement,
    pub name: String,
    pub image: ImageRef,
}

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub root_categories: usize,
    pub sub_categories: usize,
    pub total_categories: usize,
    pub total_variations: usize,
    /// Featured images plus variation images.
    pub total_images: usize,
}
