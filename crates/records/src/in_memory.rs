//! In-memory record store for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use iapflow_catalog::ProductId;

use crate::record::PurchaseRecord;
use crate::store::{RecordStore, RecordStoreError};

/// In-memory `RecordStore`.
///
/// Intended for tests/dev. Typed records can never surface as `Corrupt`;
/// only a persistent adapter can.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<ProductId, PurchaseRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held (test assertions).
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_record(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<PurchaseRecord>, RecordStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| RecordStoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(records.get(product_id).cloned())
    }

    async fn save_record(&self, record: &PurchaseRecord) -> Result<(), RecordStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RecordStoreError::Unavailable("lock poisoned".to_string()))?;

        records.insert(record.product_id().clone(), record.clone());
        Ok(())
    }

    async fn remove_record(&self, record: &PurchaseRecord) -> Result<(), RecordStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RecordStoreError::Unavailable("lock poisoned".to_string()))?;

        records.remove(record.product_id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use iapflow_catalog::Product;

    use crate::receipt::Receipt;

    use super::*;

    fn record(id: &str, receipt: &str) -> PurchaseRecord {
        PurchaseRecord::new(Product::new(ProductId::from(id)), Receipt::new(receipt))
    }

    #[tokio::test]
    async fn save_get_remove_roundtrip() {
        let store = InMemoryRecordStore::new();
        let rec = record("p1", "r1");

        store.save_record(&rec).await.unwrap();
        assert_eq!(store.get_record(&ProductId::from("p1")).await.unwrap(), Some(rec.clone()));

        store.remove_record(&rec).await.unwrap();
        assert_eq!(store.get_record(&ProductId::from("p1")).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn saving_twice_keeps_a_single_record_per_product() {
        let store = InMemoryRecordStore::new();

        store.save_record(&record("p1", "r1")).await.unwrap();
        store.save_record(&record("p1", "r2")).await.unwrap();

        assert_eq!(store.len(), 1);
        let stored = store
            .get_record(&ProductId::from("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.payment.transaction_receipt.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn records_are_keyed_by_product_id() {
        let store = InMemoryRecordStore::new();

        store.save_record(&record("p1", "r1")).await.unwrap();
        store.save_record(&record("p2", "r2")).await.unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get_record(&ProductId::from("p1")).await.unwrap().is_some());
        assert!(store.get_record(&ProductId::from("p3")).await.unwrap().is_none());
    }
}
