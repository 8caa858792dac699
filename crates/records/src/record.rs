//! Pending purchase record.

use serde::{Deserialize, Serialize};

use iapflow_catalog::{Product, ProductId};

use crate::receipt::Receipt;

/// A paid-but-unsubmitted purchase, durably keyed by product id.
///
/// Invariant: at most one record exists per product id at any time. A record
/// is created when a payment succeeds but the application-side submission
/// does not (or could not run for lack of authentication), and destroyed only
/// when a later submission of this exact record succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub product: Product,
    pub payment: Receipt,
}

impl PurchaseRecord {
    pub fn new(product: Product, payment: Receipt) -> Self {
        Self { product, payment }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product.identifier
    }
}
