//! Product catalog module.
//!
//! This crate owns the product data the filter engine reads: the `Product`
//! shape, the category vocabulary, the `{ "products": [...] }` document, the
//! write-once `CatalogHandle`, and loading with bounded retry.

pub mod catalog;
pub mod product;
pub mod retry;

pub use catalog::{
    CatalogDocument, CatalogError, CatalogHandle, CatalogStore, InMemoryCatalogStore,
    JsonFileCatalogStore,
};
pub use product::{Category, CategoryTag, Product};
pub use retry::{CatalogLoader, LoadOutcome, RetryPolicy};
