//! `iapflow-catalog` — product identity and catalog access.
//!
//! This crate owns the product-side vocabulary (identifiers, platform
//! metadata) and the memoized, single-flight loader used by the purchase
//! flow. It performs no payment or persistence work.

pub mod cache;
pub mod catalog;
pub mod id;
pub mod product;

pub use cache::ProductCache;
pub use catalog::{CatalogError, ProductCatalog};
pub use id::ProductId;
pub use product::Product;
