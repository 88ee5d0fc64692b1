use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A custom category stored in the `categories` collection.
///
/// `id`, `created_at` and `updated_at` are assigned by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub root_category: String,
    pub sub_category: String,
    #[serde(rename = "type")]
    pub category_type: String,
    pub featured_image: String,
    pub image_path: String,
    #[serde(default)]
    pub variations: Vec<Variation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn placement(&self) -> Placement {
        Placement {
            root_category: self.root_category.clone(),
            sub_category: self.sub_category.clone(),
            category_type: self.category_type.clone(),
        }
    }

    pub fn variation(&self, variation_id: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == variation_id)
    }
}

/// Image-bearing entry embedded in its parent's `variations` array.
///
/// Timestamps are client-generated ISO-8601 strings, unlike the parent's
/// store-assigned timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: String,
    pub name: String,
    pub image: String,
    pub image_path: String,
    #[serde(rename = "type")]
    pub category_type: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields supplied when creating a category document.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub placement: Placement,
    pub featured_image: String,
    pub image_path: String,
    pub variations: Vec<Variation>,
}

/// Partial update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub placement: Option<Placement>,
    pub featured_image: Option<String>,
    pub image_path: Option<String>,
    pub variations: Option<Vec<Variation>>,
}

impl CategoryPatch {
    /// Apply the patch in place. The caller is responsible for `updated_at`.
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(placement) = self.placement {
            category.root_category = placement.root_category;
            category.sub_category = placement.sub_category;
            category.category_type = placement.category_type;
        }
        if let Some(url) = self.featured_image {
            category.featured_image = url;
        }
        if let Some(path) = self.image_path {
            category.image_path = path;
        }
        if let Some(variations) = self.variations {
            category.variations = variations;
        }
    }
}

/// Position of a category in the taxonomy tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub root_category: String,
    pub sub_category: String,
    #[serde(rename = "type")]
    pub category_type: String,
}

impl Placement {
    pub fn new(
        root_category: impl Into<String>,
        sub_category: impl Into<String>,
        category_type: impl Into<String>,
    ) -> Self {
        Self {
            root_category: root_category.into(),
            sub_category: sub_category.into(),
            category_type: category_type.into(),
        }
    }

    pub fn key(&self) -> TaxonomyKey {
        TaxonomyKey::new(&self.root_category, &self.sub_category)
    }
}

/// `(root, sub)` pair. Type is deliberately not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxonomyKey {
    pub root_category: String,
    pub sub_category: String,
}

impl TaxonomyKey {
    pub fn new(root_category: impl Into<String>, sub_category: impl Into<String>) -> Self {
        Self {
            root_category: root_category.into(),
            sub_category: sub_category.into(),
        }
    }
}

impl fmt::Display for TaxonomyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.root_category, self.sub_category)
    }
}
