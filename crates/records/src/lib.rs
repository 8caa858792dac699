//! `iapflow-records` — durable pending-purchase records.
//!
//! A pending record is the system's only durable trace of a payment that has
//! not been submitted to the application backend yet. This crate defines the
//! record shape, the store contract the purchase flow depends on, an
//! in-memory store for tests/dev, and an adapter that persists records
//! through any remote-synced key-value store.

pub mod in_memory;
pub mod kv;
pub mod receipt;
pub mod record;
pub mod store;

pub use in_memory::InMemoryRecordStore;
pub use kv::{KeyValueStore, KvRecordStore};
pub use receipt::Receipt;
pub use record::PurchaseRecord;
pub use store::{RecordStore, RecordStoreError};
