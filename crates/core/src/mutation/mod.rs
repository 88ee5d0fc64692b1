pub mod service;
pub mod types;

pub use service::CategoryService;
pub use types::{CatalogStats, CategoryUpdate, NewCategory, NewVariation, VariationUpdate};
