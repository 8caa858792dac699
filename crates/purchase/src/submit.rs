//! Application-side submission contract.
//!
//! Submission is the application-defined step that redeems a receipt against
//! a remote account (course enrollment, entitlement grant, and so on). The
//! purchase flow only cares whether it stuck.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use iapflow_catalog::Product;
use iapflow_records::{PurchaseRecord, Receipt};

use crate::outcome::{Outcome, ReturnCode};

/// What the submission callback is asked to redeem.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// `None` signals that no product is available. Implementations must
    /// handle that case explicitly rather than unwrap.
    pub product: Option<Product>,
    pub payment: Option<Receipt>,

    /// True only when the purchase was recovered from a pending record left
    /// by an earlier session, rather than paid in this call.
    pub restored: bool,
}

impl SubmissionRequest {
    pub fn fresh(product: Product, payment: Receipt) -> Self {
        Self {
            product: Some(product),
            payment: Some(payment),
            restored: false,
        }
    }

    pub fn from_record(record: &PurchaseRecord) -> Self {
        Self {
            product: Some(record.product.clone()),
            payment: Some(record.payment.clone()),
            restored: true,
        }
    }
}

/// Failure reported by the submission callback.
///
/// A callback that wants a specific code surfaced to the caller embeds it
/// via [`SubmissionError::with_code`]; otherwise the flow reports
/// `RC_IAP_CALLBACK`.
#[derive(Debug, Error)]
#[error("submission failed: {cause}")]
pub struct SubmissionError {
    pub rc: Option<ReturnCode>,
    pub cause: anyhow::Error,
}

impl SubmissionError {
    pub fn new(cause: impl Into<anyhow::Error>) -> Self {
        Self {
            rc: None,
            cause: cause.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            rc: None,
            cause: anyhow::anyhow!(message.into()),
        }
    }

    pub fn with_code(mut self, rc: ReturnCode) -> Self {
        self.rc = Some(rc);
        self
    }
}

impl From<SubmissionError> for Outcome {
    fn from(err: SubmissionError) -> Self {
        let rc = err.rc.unwrap_or(ReturnCode::CallbackFailed);
        Outcome::failure(rc, err.cause)
    }
}

/// Application-supplied submission step.
///
/// The returned [`Outcome`] is handed back to the caller of `purchase`
/// (possibly reshaped when a pending record had to be saved); any
/// passthrough data it carries survives untouched. `rc == RC_OK` is the one
/// signal the flow interprets: it means the submission is durable on the
/// application side.
#[async_trait]
pub trait SubmitPurchase: Send + Sync {
    async fn submit(&self, request: SubmissionRequest) -> Result<Outcome, SubmissionError>;
}

#[async_trait]
impl<C> SubmitPurchase for Arc<C>
where
    C: SubmitPurchase + ?Sized,
{
    async fn submit(&self, request: SubmissionRequest) -> Result<Outcome, SubmissionError> {
        (**self).submit(request).await
    }
}
