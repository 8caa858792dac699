//! Platform product metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::id::ProductId;

/// Purchasable product metadata as returned by the platform catalog.
///
/// Only the identifier is required; everything else is display metadata the
/// platform may or may not provide. Unrecognized platform fields are kept
/// verbatim in `extra` so they survive a store round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub identifier: ProductId,

    /// Localized display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Localized, formatted display price (e.g. `"¥68.00"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_string: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Product {
    pub fn new(identifier: ProductId) -> Self {
        Self {
            identifier,
            title: None,
            price_string: None,
            extra: Map::new(),
        }
    }
}
