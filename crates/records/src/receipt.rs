//! Payment confirmation data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Payment confirmation returned by the platform after a successful charge.
///
/// The platform payload is opaque apart from `transactionReceipt`, the field
/// later verification needs. Older clients stored the same value under
/// `receipt`; [`Receipt::normalize`] folds such legacy payloads into the
/// canonical field when records are read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_receipt: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Receipt {
    pub fn new(transaction_receipt: impl Into<String>) -> Self {
        Self {
            transaction_receipt: Some(transaction_receipt.into()),
            extra: Map::new(),
        }
    }

    /// Copy a legacy `receipt` field into the canonical slot when the slot is
    /// empty. The legacy field itself is left in place.
    pub fn normalize(&mut self) {
        if self.transaction_receipt.is_none() {
            if let Some(JsonValue::String(legacy)) = self.extra.get("receipt") {
                self.transaction_receipt = Some(legacy.clone());
            }
        }
    }

    /// Whether the receipt carries the payload needed for verification.
    pub fn has_transaction_receipt(&self) -> bool {
        self.transaction_receipt
            .as_deref()
            .is_some_and(|receipt| !receipt.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_copies_legacy_receipt_field() {
        let mut receipt: Receipt =
            serde_json::from_str(r#"{"receipt":"legacy-blob","productId":"p1"}"#).unwrap();
        assert!(receipt.transaction_receipt.is_none());

        receipt.normalize();

        assert_eq!(receipt.transaction_receipt.as_deref(), Some("legacy-blob"));
        // The legacy field stays put for old readers.
        assert_eq!(
            receipt.extra.get("receipt"),
            Some(&JsonValue::String("legacy-blob".into()))
        );
    }

    #[test]
    fn normalize_keeps_canonical_field_when_present() {
        let mut receipt: Receipt = serde_json::from_str(
            r#"{"transactionReceipt":"canonical","receipt":"legacy"}"#,
        )
        .unwrap();

        receipt.normalize();

        assert_eq!(receipt.transaction_receipt.as_deref(), Some("canonical"));
    }

    #[test]
    fn empty_transaction_receipt_does_not_count_as_usable() {
        let receipt = Receipt {
            transaction_receipt: Some(String::new()),
            extra: Map::new(),
        };

        assert!(!receipt.has_transaction_receipt());
        assert!(Receipt::new("blob").has_transaction_receipt());
    }
}
