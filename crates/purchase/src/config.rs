//! Purchase flow configuration.

use iapflow_catalog::ProductId;

/// Immutable configuration for one [`crate::PurchaseOrchestrator`].
///
/// Defaults: the platform product id equals the application-level id, and
/// the unauthenticated-purchase prompt is shown.
#[derive(Debug, Clone)]
pub struct PurchaseConfig {
    product_id: ProductId,
    platform_product_id: Option<ProductId>,
    prompt_when_unauthenticated: bool,
}

impl PurchaseConfig {
    pub fn new(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            platform_product_id: None,
            prompt_when_unauthenticated: true,
        }
    }

    /// Use a different id for catalog lookup, payment and record keying than
    /// the application-level id.
    pub fn with_platform_product_id(mut self, id: impl Into<ProductId>) -> Self {
        self.platform_product_id = Some(id.into());
        self
    }

    /// Never prompt; unauthenticated payments go straight to the platform.
    pub fn without_login_prompt(mut self) -> Self {
        self.prompt_when_unauthenticated = false;
        self
    }

    /// Application-level product id.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Id used against the platform catalog, payment API and record store.
    pub fn platform_product_id(&self) -> &ProductId {
        self.platform_product_id.as_ref().unwrap_or(&self.product_id)
    }

    pub fn prompts_when_unauthenticated(&self) -> bool {
        self.prompt_when_unauthenticated
    }
}
