//! Key-value persistence adapter.
//!
//! Records are kept in whatever remote-synced key-value storage the host
//! application provides (e.g. a cloud-synced device store), serialized as
//! JSON under a per-product key. The adapter owns key derivation, the wire
//! codec, and read-time normalization of legacy receipts; the storage itself
//! stays a thin string-in/string-out interface.

use async_trait::async_trait;
use tracing::debug;

use iapflow_catalog::ProductId;

use crate::record::PurchaseRecord;
use crate::store::{RecordStore, RecordStoreError};

/// Remote-synced string key-value storage supplied by the application.
///
/// Failures are heterogeneous (FFI, network, quota), so they travel as
/// `anyhow::Error` and are classified by the adapter.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

/// `RecordStore` over a [`KeyValueStore`].
///
/// Keys are `"<namespace>-<productId>"`, where the namespace is typically
/// the application bundle identifier; without a namespace the key is the
/// bare product id. Undecodable payloads are reported as
/// [`RecordStoreError::Corrupt`], storage failures as
/// [`RecordStoreError::Unavailable`].
#[derive(Debug)]
pub struct KvRecordStore<S> {
    kv: S,
    prefix: String,
}

impl<S> KvRecordStore<S> {
    pub fn new(kv: S, namespace: Option<&str>) -> Self {
        let prefix = match namespace {
            Some(namespace) if !namespace.is_empty() => format!("{namespace}-"),
            _ => String::new(),
        };
        Self { kv, prefix }
    }

    /// Storage key holding the pending record for `product_id`.
    pub fn record_key(&self, product_id: &ProductId) -> String {
        format!("{}{}", self.prefix, product_id)
    }
}

#[async_trait]
impl<S> RecordStore for KvRecordStore<S>
where
    S: KeyValueStore,
{
    async fn get_record(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<PurchaseRecord>, RecordStoreError> {
        let key = self.record_key(product_id);
        let raw = self
            .kv
            .get_item(&key)
            .await
            .map_err(|e| RecordStoreError::Unavailable(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let mut record: PurchaseRecord =
            serde_json::from_str(&raw).map_err(|e| RecordStoreError::Corrupt(e.to_string()))?;
        record.payment.normalize();

        debug!(%key, "loaded pending purchase record");
        Ok(Some(record))
    }

    async fn save_record(&self, record: &PurchaseRecord) -> Result<(), RecordStoreError> {
        let key = self.record_key(record.product_id());
        let value = serde_json::to_string(record)
            .map_err(|e| RecordStoreError::Unavailable(e.to_string()))?;

        self.kv
            .set_item(&key, &value)
            .await
            .map_err(|e| RecordStoreError::Unavailable(e.to_string()))?;

        debug!(%key, "saved pending purchase record");
        Ok(())
    }

    async fn remove_record(&self, record: &PurchaseRecord) -> Result<(), RecordStoreError> {
        let key = self.record_key(record.product_id());

        self.kv
            .remove_item(&key)
            .await
            .map_err(|e| RecordStoreError::Unavailable(e.to_string()))?;

        debug!(%key, "removed pending purchase record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::anyhow;
    use iapflow_catalog::Product;

    use crate::receipt::Receipt;

    use super::*;

    #[derive(Default)]
    struct MemoryKv {
        items: Mutex<HashMap<String, String>>,
        unreachable: AtomicBool,
    }

    impl MemoryKv {
        fn with_item(key: &str, value: &str) -> Self {
            let kv = Self::default();
            kv.items
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            kv
        }

        fn make_unreachable(&self) {
            self.unreachable.store(true, Ordering::SeqCst);
        }

        fn check_reachable(&self) -> anyhow::Result<()> {
            if self.unreachable.load(Ordering::SeqCst) {
                Err(anyhow!("icloud not reachable"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for MemoryKv {
        async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.check_reachable()?;
            Ok(self.items.lock().unwrap().get(key).cloned())
        }

        async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.check_reachable()?;
            self.items
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
            self.check_reachable()?;
            self.items.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn record(id: &str, receipt: &str) -> PurchaseRecord {
        PurchaseRecord::new(Product::new(ProductId::from(id)), Receipt::new(receipt))
    }

    #[test]
    fn keys_are_namespaced_when_a_namespace_exists() {
        let namespaced = KvRecordStore::new(MemoryKv::default(), Some("com.example.app"));
        let bare = KvRecordStore::new(MemoryKv::default(), None);
        let empty = KvRecordStore::new(MemoryKv::default(), Some(""));

        assert_eq!(
            namespaced.record_key(&ProductId::from("p1")),
            "com.example.app-p1"
        );
        assert_eq!(bare.record_key(&ProductId::from("p1")), "p1");
        assert_eq!(empty.record_key(&ProductId::from("p1")), "p1");
    }

    #[tokio::test]
    async fn save_then_get_roundtrips_under_the_derived_key() {
        let store = KvRecordStore::new(MemoryKv::default(), Some("com.example.app"));
        let rec = record("p1", "r1");

        store.save_record(&rec).await.unwrap();

        let raw = store
            .kv
            .items
            .lock()
            .unwrap()
            .get("com.example.app-p1")
            .cloned();
        assert!(raw.is_some(), "record stored under namespaced key");

        let loaded = store
            .get_record(&ProductId::from("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, rec);
    }

    #[tokio::test]
    async fn legacy_receipts_are_normalized_on_read() {
        let raw = r#"{
            "product": {"identifier": "p1", "title": "Premium"},
            "payment": {"receipt": "legacy-blob"}
        }"#;
        let store = KvRecordStore::new(MemoryKv::with_item("p1", raw), None);

        let loaded = store
            .get_record(&ProductId::from("p1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            loaded.payment.transaction_receipt.as_deref(),
            Some("legacy-blob")
        );
    }

    #[tokio::test]
    async fn undecodable_payloads_are_corrupt() {
        let store = KvRecordStore::new(MemoryKv::with_item("p1", r#"{"product": 42}"#), None);

        let err = store.get_record(&ProductId::from("p1")).await.unwrap_err();

        assert!(matches!(err, RecordStoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn storage_failures_are_unavailable() {
        let kv = MemoryKv::default();
        kv.make_unreachable();
        let store = KvRecordStore::new(kv, None);

        let err = store.get_record(&ProductId::from("p1")).await.unwrap_err();
        assert!(matches!(err, RecordStoreError::Unavailable(_)));

        let err = store.save_record(&record("p1", "r1")).await.unwrap_err();
        assert!(matches!(err, RecordStoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn remove_deletes_the_stored_record() {
        let store = KvRecordStore::new(MemoryKv::default(), Some("app"));
        let rec = record("p1", "r1");

        store.save_record(&rec).await.unwrap();
        store.remove_record(&rec).await.unwrap();

        assert_eq!(store.get_record(&ProductId::from("p1")).await.unwrap(), None);
    }
}
