//! Fixed root → sub → type classification.
//!
//! Loaded once at start-up and shared read-only; it is configuration, not
//! user data.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::validate::ValidationError;
use crate::document::Placement;

const ROOTS: [&str; 5] = [
    "Traditional",
    "Modern",
    "Industrial",
    "Transitional",
    "Mid-Century Modern",
];

const SUBS: [(&str, &[&str]); 9] = [
    ("Living Room", &["Sofas", "Coffee Tables", "Rugs", "Lighting", "Wall Decor"]),
    ("Bedroom", &["Beds", "Wardrobes", "Nightstands", "Lighting", "Textiles"]),
    ("Dining Room", &["Dining Tables", "Dining Chairs", "Sideboards", "Lighting"]),
    ("Kitchen", &["Cabinets", "Countertops", "Small Appliances", "Lighting"]),
    ("Courtyard", &["Seating", "Planters", "Water Features", "Lighting"]),
    ("Study/Home Office", &["Desks", "Office Chairs", "Shelving", "Lighting"]),
    ("Entryway/Foyer", &["Console Tables", "Mirrors", "Shoe Storage", "Lighting"]),
    ("Bathroom", &["Vanities", "Fixtures", "Tiles", "Lighting"]),
    ("Pooja Room", &["Mandirs", "Diyas & Lamps", "Wall Panels", "Storage"]),
];

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse taxonomy: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid taxonomy: {0}")]
    Invalid(String),
}

/// Root categories, sub categories and the `root × sub → types` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    roots: Vec<String>,
    subs: Vec<String>,
    /// root → sub → types
    types: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Taxonomy {
    pub fn new(
        roots: Vec<String>,
        subs: Vec<String>,
        types: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    ) -> Result<Self, TaxonomyError> {
        let taxonomy = Self { roots, subs, types };
        taxonomy.check()?;
        Ok(taxonomy)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TaxonomyError> {
        let taxonomy: Taxonomy = serde_json::from_str(raw)?;
        taxonomy.check()?;
        Ok(taxonomy)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn subs(&self) -> &[String] {
        &self.subs
    }

    /// Types for a `(root, sub)` pair; empty when the pair has none.
    pub fn types(&self, root: &str, sub: &str) -> &[String] {
        self.types
            .get(root)
            .and_then(|subs| subs.get(sub))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_root(&self, root: &str) -> bool {
        self.roots.iter().any(|r| r == root)
    }

    pub fn has_sub(&self, sub: &str) -> bool {
        self.subs.iter().any(|s| s == sub)
    }

    pub fn validate_placement(&self, placement: &Placement) -> Result<(), ValidationError> {
        if !self.has_root(&placement.root_category) {
            return Err(ValidationError::UnknownRoot(placement.root_category.clone()));
        }
        if !self.has_sub(&placement.sub_category) {
            return Err(ValidationError::UnknownSub(placement.sub_category.clone()));
        }
        let known = self
            .types(&placement.root_category, &placement.sub_category)
            .iter()
            .any(|t| *t == placement.category_type);
        if !known {
            return Err(ValidationError::UnknownType {
                root: placement.root_category.clone(),
                sub: placement.sub_category.clone(),
                category_type: placement.category_type.clone(),
            });
        }
        Ok(())
    }

    fn check(&self) -> Result<(), TaxonomyError> {
        if self.roots.is_empty() || self.subs.is_empty() {
            return Err(TaxonomyError::Invalid(
                "at least one root and one sub category are required".into(),
            ));
        }
        for (root, subs) in &self.types {
            if !self.has_root(root) {
                return Err(TaxonomyError::Invalid(format!(
                    "types listed for unknown root `{root}`"
                )));
            }
            if let Some(sub) = subs.keys().find(|sub| !self.has_sub(sub)) {
                return Err(TaxonomyError::Invalid(format!(
                    "types listed for unknown sub `{sub}` under `{root}`"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        let per_sub: BTreeMap<String, Vec<String>> = SUBS
            .iter()
            .map(|(sub, types)| {
                (
                    sub.to_string(),
                    types.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();
        Self {
            roots: ROOTS.iter().map(|r| r.to_string()).collect(),
            subs: SUBS.iter().map(|(s, _)| s.to_string()).collect(),
            types: ROOTS
                .iter()
                .map(|root| (root.to_string(), per_sub.clone()))
                .collect(),
        }
    }
}
