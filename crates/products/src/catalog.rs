//! Catalog document, stores, and the write-once catalog handle.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use kulinastra_core::IdentitySet;

use crate::product::Product;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(String),

    #[error("failed to parse catalog JSON: {0}")]
    Parse(String),

    #[error("catalog JSON is not an object with a `products` array")]
    UnknownShape,

    #[error("catalog already loaded")]
    AlreadyLoaded,
}

/// The `{ "products": [...] }` envelope owned by the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub products: Vec<Product>,
}

#[derive(Deserialize)]
struct RawDocument {
    products: Vec<JsonValue>,
}

impl CatalogDocument {
    /// Parse a catalog document, dropping entries that fail to decode or
    /// validate (and duplicate ids) instead of rejecting the whole catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: JsonValue =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let raw: RawDocument =
            serde_json::from_value(value).map_err(|_| CatalogError::UnknownShape)?;

        let mut seen = IdentitySet::new();
        let mut products = Vec::with_capacity(raw.products.len());
        for (index, entry) in raw.products.into_iter().enumerate() {
            let product: Product = match serde_json::from_value(entry) {
                Ok(p) => p,
                Err(err) => {
                    tracing::warn!(index, error = %err, "dropping undecodable catalog entry");
                    continue;
                }
            };
            if let Err(err) = product.validate() {
                tracing::warn!(index, error = %err, "dropping invalid catalog entry");
                continue;
            }
            if !seen.admit(&product) {
                tracing::warn!(index, product_id = %product.id, "dropping duplicate catalog entry");
                continue;
            }
            products.push(product);
        }

        Ok(Self { products })
    }
}

/// Source of the product catalog (fetch/caching lives behind this seam).
///
/// Implementations must be idempotent and cache the first successful load.
pub trait CatalogStore {
    fn load_catalog(&self) -> Result<Vec<Product>, CatalogError>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn load_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        (**self).load_catalog()
    }
}

/// Reads the catalog from a JSON file on disk.
#[derive(Debug)]
pub struct JsonFileCatalogStore {
    path: PathBuf,
    cache: OnceLock<Vec<Product>>,
}

impl JsonFileCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read catalog file at {:?}", self.path))
    }
}

impl CatalogStore for JsonFileCatalogStore {
    fn load_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(products) = self.cache.get() {
            tracing::debug!("using cached catalog");
            return Ok(products.clone());
        }

        let json = self.read().map_err(|e| CatalogError::Io(format!("{e:#}")))?;
        let document = CatalogDocument::from_json(&json)?;
        tracing::info!(count = document.products.len(), path = ?self.path, "catalog loaded");

        Ok(self.cache.get_or_init(|| document.products).clone())
    }
}

/// In-memory store for tests/dev.
///
/// Can be told to fail a number of times before serving its products.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: Vec<Product>,
    failures_left: std::sync::Mutex<u32>,
}

impl InMemoryCatalogStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            failures_left: std::sync::Mutex::new(0),
        }
    }

    /// Fail the first `n` loads with an IO error.
    pub fn failing_first(mut self, n: u32) -> Self {
        self.failures_left = std::sync::Mutex::new(n);
        self
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn load_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        if let Ok(mut left) = self.failures_left.lock() {
            if *left > 0 {
                *left -= 1;
                return Err(CatalogError::Io("simulated network failure".to_string()));
            }
        }
        Ok(self.products.clone())
    }
}

#[derive(Debug)]
struct CatalogSnapshot {
    products: Vec<Product>,
    loaded_at: DateTime<Utc>,
}

/// Shared, write-once view of the loaded catalog.
///
/// Cloning shares the same snapshot. Readiness is an explicit flag: a loaded
/// empty catalog is ready, an unloaded one is not.
#[derive(Debug, Clone, Default)]
pub struct CatalogHandle {
    inner: Arc<OnceLock<CatalogSnapshot>>,
}

impl CatalogHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a handle that is already loaded (tests, server-provided data).
    pub fn loaded(products: Vec<Product>) -> Self {
        let handle = Self::new();
        let _ = handle.publish(products);
        handle
    }

    /// Publish the catalog. Only the first publish wins.
    pub fn publish(&self, products: Vec<Product>) -> Result<(), CatalogError> {
        let snapshot = CatalogSnapshot {
            products,
            loaded_at: Utc::now(),
        };
        self.inner
            .set(snapshot)
            .map_err(|_| CatalogError::AlreadyLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.get().is_some()
    }

    /// Products, or `None` while the catalog is still loading.
    pub fn products(&self) -> Option<&[Product]> {
        self.inner.get().map(|s| s.products.as_slice())
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.inner.get().map(|s| s.loaded_at)
    }
}
