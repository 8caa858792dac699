//! Record store contract.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use iapflow_catalog::ProductId;

use crate::record::PurchaseRecord;

/// Record store operation error.
///
/// The two variants drive very different recovery paths in the purchase
/// flow: `Unavailable` is tolerated on reads (the flow proceeds as if no
/// record existed), while `Corrupt` aborts the flow so a broken record is
/// never masked by a fresh duplicate payment.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// The backing store could not be reached or the operation failed
    /// transiently.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// A stored payload exists for the key but does not decode into a
    /// `(product, payment)` record.
    #[error("stored purchase record is malformed: {0}")]
    Corrupt(String),
}

/// Durable mapping from product id to at most one pending purchase record.
///
/// Treated as a remote service: every call may suspend for unbounded time
/// and fail independently. Implementations must never expose a torn record;
/// a read observes either the full `(product, payment)` pair or nothing.
/// `save_record` replaces any existing record for the same product id, which
/// is what keeps the at-most-one-record-per-product invariant.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_record(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<PurchaseRecord>, RecordStoreError>;

    async fn save_record(&self, record: &PurchaseRecord) -> Result<(), RecordStoreError>;

    async fn remove_record(&self, record: &PurchaseRecord) -> Result<(), RecordStoreError>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn get_record(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<PurchaseRecord>, RecordStoreError> {
        (**self).get_record(product_id).await
    }

    async fn save_record(&self, record: &PurchaseRecord) -> Result<(), RecordStoreError> {
        (**self).save_record(record).await
    }

    async fn remove_record(&self, record: &PurchaseRecord) -> Result<(), RecordStoreError> {
        (**self).remove_record(record).await
    }
}
