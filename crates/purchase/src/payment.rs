//! Platform payment execution and the unauthenticated-purchase prompt.

use async_trait::async_trait;
use thiserror::Error;

use iapflow_catalog::ProductId;
use iapflow_records::Receipt;

/// Payment failure taxonomy.
///
/// None of these are retried automatically; the only recovery is the user
/// answering the prompt differently on the next attempt.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The platform rejected or failed the payment.
    #[error("platform payment failed: {0}")]
    Declined(String),

    /// The user abandoned the attempt, directly or by choosing to log in
    /// first.
    #[error("payment cancelled by user")]
    Cancelled,

    /// Remote-synced storage is needed to carry a pending record across
    /// devices but is switched off or unreachable.
    #[error("cloud storage is not available")]
    StorageUnavailable,

    /// The cloud-storage availability probe itself failed.
    #[error("cloud storage availability check failed: {0}")]
    StorageProbe(String),
}

/// Platform purchase API.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Execute a payment for the product and return its receipt.
    async fn purchase_product(&self, product_id: &ProductId) -> Result<Receipt, PaymentError>;
}

/// Probe for the device's remote-synced storage.
///
/// Checked before letting a logged-out user pay: without it, a pending
/// record could not be recovered on another device.
#[async_trait]
pub trait CloudAvailability: Send + Sync {
    async fn is_storage_available(&self) -> anyhow::Result<bool>;
}

/// The user's answer when asked about buying while logged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    /// Abandon the attempt and open the login flow.
    Login,
    /// Pay anyway; a pending record will ride on cloud storage.
    Continue,
    /// Abandon the attempt.
    Cancel,
}

/// UI collaborator presenting the three-way choice.
#[async_trait]
pub trait PurchasePrompt: Send + Sync {
    async fn ask_unauthenticated_purchase(&self) -> PromptChoice;
}
