//! Purchase outcome contract.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Result code attached to every purchase outcome.
///
/// The named variants are the codes the flow produces itself. Application
/// callbacks may report any other code; such codes travel through the flow
/// verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnCode {
    /// Submission succeeded.
    #[serde(rename = "RC_OK")]
    Ok,

    /// A pending record was saved (or already exists) for a later attempt.
    #[serde(rename = "RC_IAP_DID_SAVE_REC")]
    RecordSaved,

    /// The submission callback failed without reporting a code of its own.
    #[serde(rename = "RC_IAP_CALLBACK")]
    CallbackFailed,

    /// Product metadata could not be loaded.
    #[serde(rename = "RC_IAP_GET_PRODUCT")]
    ProductUnavailable,

    /// The platform payment failed, was cancelled, or required cloud
    /// storage that was not available.
    #[serde(rename = "RC_IAP_PURCHASE")]
    PaymentFailed,

    /// Payment succeeded but no pending record could be written.
    #[serde(rename = "RC_IAP_SAVE_REC")]
    RecordSaveFailed,

    /// A stored record exists but is malformed.
    #[serde(rename = "RC_IAP_BAD_REC")]
    InvalidRecord,

    /// Application-defined code, passed through unchanged.
    #[serde(untagged)]
    Other(String),
}

impl ReturnCode {
    pub fn as_str(&self) -> &str {
        match self {
            ReturnCode::Ok => "RC_OK",
            ReturnCode::RecordSaved => "RC_IAP_DID_SAVE_REC",
            ReturnCode::CallbackFailed => "RC_IAP_CALLBACK",
            ReturnCode::ProductUnavailable => "RC_IAP_GET_PRODUCT",
            ReturnCode::PaymentFailed => "RC_IAP_PURCHASE",
            ReturnCode::RecordSaveFailed => "RC_IAP_SAVE_REC",
            ReturnCode::InvalidRecord => "RC_IAP_BAD_REC",
            ReturnCode::Other(code) => code,
        }
    }
}

impl core::fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Tagged result of one purchase attempt.
///
/// Success and failure both arrive as an `Outcome`; no collaborator failure
/// escapes the flow as a panic or a raw error. `extra` holds whatever
/// passthrough data the submission callback attached, flattened on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub rc: ReturnCode,

    /// Description of the underlying failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// True when a pending record exists for this purchase after the call.
    #[serde(default, skip_serializing_if = "is_false")]
    pub record_pending: bool,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Outcome {
    pub fn new(rc: ReturnCode) -> Self {
        Self {
            rc,
            error: None,
            record_pending: false,
            extra: Map::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(ReturnCode::Ok)
    }

    pub fn failure(rc: ReturnCode, error: impl core::fmt::Display) -> Self {
        let mut outcome = Self::new(rc);
        outcome.error = Some(error.to_string());
        outcome
    }

    /// Attach passthrough data for the application.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.rc == ReturnCode::Ok
    }
}
