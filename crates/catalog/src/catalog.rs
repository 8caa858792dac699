//! Product catalog lookup abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::id::ProductId;
use crate::product::Product;

/// Catalog lookup error.
///
/// `Clone` is required because a single in-flight load may be awaited by many
/// callers (see [`crate::cache::ProductCache`]), each of which observes the
/// same failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog request itself failed (network, platform rejection).
    #[error("product catalog lookup failed: {0}")]
    Lookup(String),

    /// The catalog answered but did not contain the requested product.
    #[error("product {0} is not available in the catalog")]
    NotFound(ProductId),
}

/// Remote product catalog (platform store API).
///
/// Every call may suspend for unbounded time and fail independently; the
/// caller decides whether and when to retry.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Load metadata for the given product ids.
    ///
    /// Products the platform does not know are simply absent from the
    /// returned list; an empty list is a valid answer.
    async fn load_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError>;
}

#[async_trait]
impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    async fn load_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        (**self).load_products(ids).await
    }
}
