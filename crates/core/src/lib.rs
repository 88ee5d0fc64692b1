//! Catalog core: the category/variation model, its storage backends and the
//! mutation and view-state layers that sit on top of them.

pub mod clock;
pub mod document;
pub mod error;
pub mod events;
pub mod mutation;
pub mod store;
pub mod taxonomy;
pub mod view;

pub use error::{CatalogError, Result};
