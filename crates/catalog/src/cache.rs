//! Memoized, single-flight product loader.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::warn;

use crate::catalog::{CatalogError, ProductCatalog};
use crate::id::ProductId;
use crate::product::Product;

type LoadFuture = Shared<BoxFuture<'static, Result<Product, CatalogError>>>;

/// Single-flight cache for one product's metadata.
///
/// The first `get()` starts the underlying catalog fetch; every call issued
/// before that fetch resolves awaits the same shared future, so the catalog
/// is hit exactly once no matter how many callers race. The eventual result
/// (success or failure) stays memoized for the cache's lifetime: a failed
/// load is surfaced consistently on every later call rather than silently
/// retried. Callers that want a fresh attempt construct a new cache.
pub struct ProductCache {
    product_id: ProductId,
    catalog: Arc<dyn ProductCatalog>,
    load: Mutex<Option<LoadFuture>>,
}

impl ProductCache {
    pub fn new(product_id: ProductId, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            product_id,
            catalog,
            load: Mutex::new(None),
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Fetch the product, deduplicating concurrent and repeated calls.
    pub async fn get(&self) -> Result<Product, CatalogError> {
        let load = {
            let mut slot = self.load.lock().await;
            match slot.as_ref() {
                Some(load) => load.clone(),
                None => {
                    let catalog = Arc::clone(&self.catalog);
                    let id = self.product_id.clone();
                    let load = async move {
                        let loaded = catalog.load_products(std::slice::from_ref(&id)).await;
                        let products = match loaded {
                            Ok(products) => products,
                            Err(err) => {
                                warn!(product_id = %id, error = %err, "product load failed");
                                return Err(err);
                            }
                        };
                        products
                            .into_iter()
                            .next()
                            .ok_or(CatalogError::NotFound(id))
                    }
                    .boxed()
                    .shared();
                    *slot = Some(load.clone());
                    load
                }
            }
        };

        load.await
    }
}

impl core::fmt::Debug for ProductCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProductCache")
            .field("product_id", &self.product_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct CountingCatalog {
        calls: AtomicUsize,
        response: Result<Vec<Product>, CatalogError>,
    }

    impl CountingCatalog {
        fn returning(response: Result<Vec<Product>, CatalogError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProductCatalog for CountingCatalog {
        async fn load_products(&self, _ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Yield so racing callers genuinely overlap with the fetch.
            tokio::task::yield_now().await;
            self.response.clone()
        }
    }

    fn product(id: &str) -> Product {
        Product::new(ProductId::from(id))
    }

    #[tokio::test]
    async fn concurrent_gets_share_a_single_fetch() {
        let catalog = CountingCatalog::returning(Ok(vec![product("p1")]));
        let cache = ProductCache::new(ProductId::from("p1"), catalog.clone());

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());

        assert_eq!(catalog.calls(), 1);
        for result in [a, b, c] {
            assert_eq!(result.unwrap().identifier, ProductId::from("p1"));
        }
    }

    #[tokio::test]
    async fn sequential_gets_reuse_the_memoized_product() {
        let catalog = CountingCatalog::returning(Ok(vec![product("p1")]));
        let cache = ProductCache::new(ProductId::from("p1"), catalog.clone());

        cache.get().await.unwrap();
        cache.get().await.unwrap();

        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn load_failure_is_surfaced_to_every_caller() {
        let catalog =
            CountingCatalog::returning(Err(CatalogError::Lookup("store unreachable".into())));
        let cache = ProductCache::new(ProductId::from("p1"), catalog.clone());

        let (a, b) = tokio::join!(cache.get(), cache.get());
        let later = cache.get().await;

        assert_eq!(catalog.calls(), 1);
        for result in [a, b, later] {
            assert_eq!(
                result.unwrap_err(),
                CatalogError::Lookup("store unreachable".into())
            );
        }
    }

    #[tokio::test]
    async fn empty_catalog_answer_is_not_found() {
        let catalog = CountingCatalog::returning(Ok(vec![]));
        let cache = ProductCache::new(ProductId::from("missing"), catalog);

        let err = cache.get().await.unwrap_err();

        assert_eq!(err, CatalogError::NotFound(ProductId::from("missing")));
    }
}
