//! # Catalog
//!
//! The product catalog is an external collaborator. This module defines the
//! port the register talks to, a file-backed implementation, and the client
//! that puts the till's rules around every call.
//!
//! ## Call Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CatalogClient                                    │
//! │                                                                         │
//! │  resolve("p-001") ──► already in flight? ── yes ──► LookupPending       │
//! │                              │ no                                       │
//! │                              ▼                                          │
//! │                   timeout(3000 ms, catalog.resolve)                     │
//! │                              │                                          │
//! │           ┌──────────────────┼──────────────────┬─────────────────┐     │
//! │           ▼                  ▼                  ▼                 ▼     │
//! │      Some(product)         None          Err(catalog)          elapsed  │
//! │           │                  │                  │                 │     │
//! │        Product        ProductNotFound   CollaboratorUnavailable ◄─┘     │
//! │                                                                         │
//! │  search(q) ──► generation n ──► response ──► n still latest? ── no ──►  │
//! │                                                   │            Superseded│
//! │                                                  yes ──► results        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pathway_core::validation::{validate_product_ref, validate_search_query, validate_unit_price};
use pathway_core::{CoreError, CoreResult, Product, ProductSummary};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::error::{RegisterError, RegisterResult};

/// Rows returned by a search.
pub const SEARCH_LIMIT: usize = 20;

// =============================================================================
// Catalog Port
// =============================================================================

/// Failure reported by a catalog implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("catalog rejected the request: {0}")]
    Rejected(String),
}

/// Product lookup and search.
///
/// `Ok(None)` means "no such product"; `Err` means the catalog itself failed.
pub trait Catalog: Send + Sync + 'static {
    fn resolve(
        &self,
        product_id: &str,
    ) -> impl Future<Output = Result<Option<Product>, CatalogError>> + Send;

    fn resolve_by_barcode(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<Product>, CatalogError>> + Send;

    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ProductSummary>, CatalogError>> + Send;
}

// =============================================================================
// In-Memory Catalog
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<Product>,
}

/// A catalog held in memory, loaded from a TOML file.
///
/// ```toml
/// [[products]]
/// id = "p-001"
/// sku = "PARA-500"
/// barcode = "6001234567890"
/// name = "Paracetamol 500mg x 24"
/// unit_price = 1000
/// generic_name = "Paracetamol"
/// strength = "500mg"
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        InMemoryCatalog { products }
    }

    pub fn from_toml_str(contents: &str) -> RegisterResult<Self> {
        let file: CatalogFile = toml::from_str(contents)
            .map_err(|e| RegisterError::CatalogLoadFailed(e.to_string()))?;

        let mut seen = HashSet::new();
        for product in &file.products {
            if !seen.insert(product.id.as_str()) {
                return Err(RegisterError::CatalogLoadFailed(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
            validate_unit_price(product.unit_price).map_err(|e| {
                RegisterError::CatalogLoadFailed(format!("product {}: {}", product.id, e))
            })?;
        }

        Ok(InMemoryCatalog::new(file.products))
    }

    pub fn load(path: &Path) -> RegisterResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RegisterError::CatalogLoadFailed(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_toml_str(&contents)?;
        info!(?path, products = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn matches(product: &Product, needle: &str) -> bool {
        product.name.to_lowercase().contains(needle)
            || product.sku.to_lowercase().contains(needle)
            || product
                .generic_name
                .as_deref()
                .is_some_and(|g| g.to_lowercase().contains(needle))
    }
}

impl Catalog for InMemoryCatalog {
    async fn resolve(&self, product_id: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.iter().find(|p| p.id == product_id).cloned())
    }

    async fn resolve_by_barcode(&self, code: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self
            .products
            .iter()
            .find(|p| p.barcode.as_deref() == Some(code))
            .cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<ProductSummary>, CatalogError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| needle.is_empty() || Self::matches(p, &needle))
            .take(SEARCH_LIMIT)
            .map(ProductSummary::from)
            .collect())
    }
}

// =============================================================================
// Catalog Client
// =============================================================================

/// Wraps a [`Catalog`] with timeouts, lookup de-duplication and
/// last-issued-wins search ordering.
///
/// Cheap to clone; clones share the in-flight set and search generation.
pub struct CatalogClient<C> {
    inner: Arc<ClientInner<C>>,
}

struct ClientInner<C> {
    catalog: C,
    timeout: Duration,
    in_flight: Mutex<HashSet<String>>,
    search_generation: AtomicU64,
}

impl<C> Clone for CatalogClient<C> {
    fn clone(&self) -> Self {
        CatalogClient {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Removes a key from the in-flight set when the lookup ends, including when
/// its future is dropped mid-flight.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl<C: Catalog> CatalogClient<C> {
    pub fn new(catalog: C, timeout: Duration) -> Self {
        CatalogClient {
            inner: Arc::new(ClientInner {
                catalog,
                timeout,
                in_flight: Mutex::new(HashSet::new()),
                search_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    #[cfg(test)]
    pub(crate) fn catalog_ref(&self) -> &C {
        &self.inner.catalog
    }

    /// Resolves a product id.
    pub async fn resolve(&self, product_id: &str) -> CoreResult<Product> {
        validate_product_ref(product_id)?;
        let product_id = product_id.trim();

        let _guard = self.claim(format!("id:{}", product_id), product_id)?;
        debug!(product_id, "Resolving product");

        let result = self.call(self.inner.catalog.resolve(product_id)).await?;
        result.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))
    }

    /// Resolves a scanned barcode.
    pub async fn resolve_by_barcode(&self, code: &str) -> CoreResult<Product> {
        validate_product_ref(code)?;
        let code = code.trim();

        let _guard = self.claim(format!("barcode:{}", code), code)?;
        debug!(barcode = code, "Resolving barcode");

        let result = self.call(self.inner.catalog.resolve_by_barcode(code)).await?;
        result.ok_or_else(|| CoreError::ProductNotFound(code.to_string()))
    }

    /// Searches the catalog.
    ///
    /// If another search is issued before this one returns, this one fails
    /// with `SearchSuperseded` and its outcome is dropped, errors and
    /// timeouts included.
    pub async fn search(&self, query: &str) -> CoreResult<Vec<ProductSummary>> {
        let query = validate_search_query(query)?;
        let generation = self.inner.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(query = %query, generation, "Searching catalog");

        let result = self.call(self.inner.catalog.search(&query)).await;

        // a newer search owns the results list, whatever this one returned
        let latest = self.inner.search_generation.load(Ordering::SeqCst);
        if latest != generation {
            debug!(generation, latest, "Discarding stale search outcome");
            return Err(CoreError::SearchSuperseded);
        }
        result
    }

    fn claim(&self, key: String, label: &str) -> CoreResult<InFlightGuard<'_>> {
        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !in_flight.insert(key.clone()) {
            debug!(lookup = label, "Lookup already in flight");
            return Err(CoreError::LookupPending(label.to_string()));
        }

        Ok(InFlightGuard {
            set: &self.inner.in_flight,
            key,
        })
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, CatalogError>>,
    ) -> CoreResult<T> {
        match tokio::time::timeout(self.inner.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                error!(error = %err, "Catalog call failed");
                Err(CoreError::CollaboratorUnavailable(err.to_string()))
            }
            Err(_) => {
                error!(timeout_ms = self.inner.timeout.as_millis() as u64, "Catalog call timed out");
                Err(CoreError::CollaboratorUnavailable(format!(
                    "no answer within {} ms",
                    self.inner.timeout.as_millis()
                )))
            }
        }
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use pathway_core::Money;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    /// A catalog with per-query latency and an optional outage.
    #[derive(Default)]
    pub struct ScriptedCatalog {
        pub products: Vec<Product>,
        pub delays: HashMap<String, Duration>,
        pub failing: bool,
        pub calls: AtomicUsize,
    }

    impl ScriptedCatalog {
        pub fn with_products(products: Vec<Product>) -> Self {
            ScriptedCatalog {
                products,
                ..Default::default()
            }
        }

        pub fn delay(mut self, key: &str, delay: Duration) -> Self {
            self.delays.insert(key.to_string(), delay);
            self
        }

        async fn answer(&self, key: &str) -> Result<(), CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(key) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing {
                return Err(CatalogError::Unavailable("connection refused".into()));
            }
            Ok(())
        }
    }

    impl Catalog for ScriptedCatalog {
        async fn resolve(&self, product_id: &str) -> Result<Option<Product>, CatalogError> {
            self.answer(product_id).await?;
            Ok(self.products.iter().find(|p| p.id == product_id).cloned())
        }

        async fn resolve_by_barcode(&self, code: &str) -> Result<Option<Product>, CatalogError> {
            self.answer(code).await?;
            Ok(self
                .products
                .iter()
                .find(|p| p.barcode.as_deref() == Some(code))
                .cloned())
        }

        async fn search(&self, query: &str) -> Result<Vec<ProductSummary>, CatalogError> {
            self.answer(query).await?;
            let needle = query.to_lowercase();
            Ok(self
                .products
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .map(ProductSummary::from)
                .collect())
        }
    }

    pub fn product(id: &str, name: &str, price_minor: i64) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("SKU-{}", id.to_uppercase()),
            barcode: Some(format!("BC-{}", id)),
            name: name.to_string(),
            unit_price: Money::from_minor(price_minor),
            generic_name: None,
            strength: None,
            requires_prescription: false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
