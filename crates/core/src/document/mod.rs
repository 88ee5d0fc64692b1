pub mod id;
pub mod image;
pub mod model;
pub mod path;
pub mod validate;

pub use image::{ImageFile, ImageRef};
pub use model::{Category, CategoryDraft, CategoryPatch, Placement, TaxonomyKey, Variation};
