//! Purchase reconciliation state machine.
//!
//! The orchestrator guarantees exactly-once-effective submission under
//! partial failure. The sequence per `purchase` call:
//!
//! ```text
//! pending record?
//!   ├─ yes ── logged in? ── no ──► defer (record waits for login)
//!   │            └─ yes ──► submit(restored) ── ok ──► remove record
//!   │                                └─ failed ──► return, record preserved
//!   └─ no ──► load product ──► pay ──► submit(fresh)
//!                 ok + logged in ──► done, nothing persisted
//!                 otherwise ──► save record for a later attempt
//! ```
//!
//! Guarantees enforced here:
//! - at most one record per product (saves replace, removals follow a
//!   successful submission of that exact record)
//! - no new payment while a record is outstanding
//! - the submission callback is the durability boundary: once it reports OK,
//!   store cleanup failures are logged, never surfaced as purchase failures
//! - no collaborator failure escapes `purchase`; everything is absorbed into
//!   a coded [`Outcome`]
//!
//! The one deliberate gap: a transiently failing record read is treated as
//! "no record" so a flaky store cannot block purchases. If the record
//! actually existed, this allows a second in-flight payment for the same
//! product; the risk is logged rather than hidden behind extra locking.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use iapflow_catalog::{CatalogError, Product, ProductCache, ProductCatalog};
use iapflow_records::{PurchaseRecord, Receipt, RecordStore, RecordStoreError};

use crate::auth::AuthenticationGate;
use crate::config::PurchaseConfig;
use crate::outcome::{Outcome, ReturnCode};
use crate::payment::{
    CloudAvailability, PaymentError, PaymentGateway, PromptChoice, PurchasePrompt,
};
use crate::submit::{SubmissionRequest, SubmitPurchase};

/// Drives the purchase lifecycle for a single product.
///
/// One instance owns one product's memoized metadata; callers are expected
/// to await one `purchase` call to completion before issuing another for the
/// same product id (the orchestrator adds no mutual exclusion of its own
/// beyond the product-load memoization).
pub struct PurchaseOrchestrator {
    config: PurchaseConfig,
    products: ProductCache,
    records: Arc<dyn RecordStore>,
    auth: Arc<dyn AuthenticationGate>,
    payments: Arc<dyn PaymentGateway>,
    cloud: Arc<dyn CloudAvailability>,
    prompt: Arc<dyn PurchasePrompt>,
}

impl PurchaseOrchestrator {
    pub fn new(
        config: PurchaseConfig,
        catalog: Arc<dyn ProductCatalog>,
        records: Arc<dyn RecordStore>,
        auth: Arc<dyn AuthenticationGate>,
        payments: Arc<dyn PaymentGateway>,
        cloud: Arc<dyn CloudAvailability>,
        prompt: Arc<dyn PurchasePrompt>,
    ) -> Self {
        let products = ProductCache::new(config.platform_product_id().clone(), catalog);
        Self {
            config,
            products,
            records,
            auth,
            payments,
            cloud,
            prompt,
        }
    }

    pub fn config(&self) -> &PurchaseConfig {
        &self.config
    }

    /// Eagerly warm the product cache.
    ///
    /// Lets the application fetch price/title ahead of showing a buy button;
    /// `purchase` will reuse the same load either way.
    pub async fn prepare(&self) -> Result<Product, CatalogError> {
        self.products.get().await
    }

    /// Run one full purchase attempt.
    ///
    /// Never panics and never lets a collaborator error escape; every exit
    /// path is an [`Outcome`] with a code from [`ReturnCode`] (or a code the
    /// callback chose to report).
    pub async fn purchase(&self, callback: &dyn SubmitPurchase) -> Outcome {
        let product_id = self.config.platform_product_id();

        // A paid-but-unsubmitted record always takes precedence over a new
        // payment.
        let existing = match self.records.get_record(product_id).await {
            Ok(existing) => existing,
            Err(RecordStoreError::Corrupt(reason)) => {
                // Never mask a broken record with a fresh duplicate payment.
                error!(product_id = %product_id, %reason, "stored purchase record is malformed");
                return Outcome::failure(ReturnCode::InvalidRecord, reason);
            }
            Err(err) => {
                // Prefer retrying the payment over blocking on a flaky read;
                // see the module docs for the double-payment risk this takes.
                warn!(
                    product_id = %product_id,
                    error = %err,
                    "record store read failed, treating as no record"
                );
                None
            }
        };

        if let Some(record) = existing {
            return self.submit_restored(callback, record).await;
        }

        let product = match self.products.get().await {
            Ok(product) => product,
            Err(err) => {
                warn!(product_id = %product_id, error = %err, "product metadata unavailable");
                return Outcome::failure(ReturnCode::ProductUnavailable, err);
            }
        };

        let payment = match self.pay().await {
            Ok(payment) => payment,
            Err(err) => {
                warn!(product_id = %product_id, error = %err, "payment did not complete");
                return Outcome::failure(ReturnCode::PaymentFailed, err);
            }
        };

        let reply = callback
            .submit(SubmissionRequest::fresh(product.clone(), payment.clone()))
            .await;
        let logged_in = self.auth.is_logged_in();
        let mut outcome = match reply {
            Ok(outcome) => outcome,
            Err(err) => Outcome::from(err),
        };

        if logged_in && outcome.is_ok() {
            return outcome;
        }

        // The user has paid but the submission did not stick (or could not be
        // attributed to an account). Persist the purchase so a later call can
        // finish the job.
        let record = PurchaseRecord::new(product, payment);
        match self.records.save_record(&record).await {
            Ok(()) => {
                info!(product_id = %product_id, "saved purchase record for a later submission");
                if !logged_in {
                    outcome.rc = ReturnCode::RecordSaved;
                }
                outcome.record_pending = true;
                outcome
            }
            Err(err) => {
                // Paid, unsubmitted and unrecorded: the one case with nothing
                // left to retry from. Surface it loudly and distinctly.
                error!(
                    product_id = %product_id,
                    error = %err,
                    "payment succeeded but the purchase record could not be saved"
                );
                Outcome::failure(ReturnCode::RecordSaveFailed, err)
            }
        }
    }

    /// Submit a record recovered from an earlier session.
    async fn submit_restored(
        &self,
        callback: &dyn SubmitPurchase,
        record: PurchaseRecord,
    ) -> Outcome {
        let product_id = self.config.platform_product_id();

        if !self.auth.is_logged_in() {
            // A record made without a login session waits for one; the
            // callback cannot attribute the purchase to an account yet.
            debug!(product_id = %product_id, "pending record exists, waiting for login");
            let mut outcome = Outcome::new(ReturnCode::RecordSaved);
            outcome.record_pending = true;
            return outcome;
        }

        match callback.submit(SubmissionRequest::from_record(&record)).await {
            Ok(outcome) if outcome.is_ok() => {
                // Submission is the durability boundary; a failed cleanup
                // must not undo it.
                if let Err(err) = self.records.remove_record(&record).await {
                    error!(
                        product_id = %product_id,
                        error = %err,
                        "failed to remove submitted purchase record"
                    );
                }
                outcome
            }
            Ok(mut outcome) => {
                outcome.record_pending = true;
                outcome
            }
            Err(err) => {
                let mut outcome = Outcome::from(err);
                outcome.record_pending = true;
                outcome
            }
        }
    }

    /// Execute the payment, routing a logged-out user through the prompt.
    async fn pay(&self) -> Result<Receipt, PaymentError> {
        if self.config.prompts_when_unauthenticated() && !self.auth.is_logged_in() {
            return match self.prompt.ask_unauthenticated_purchase().await {
                PromptChoice::Login => {
                    // Abandon this attempt; the login flow runs on its own.
                    self.auth.login();
                    Err(PaymentError::Cancelled)
                }
                PromptChoice::Continue => match self.cloud.is_storage_available().await {
                    Ok(true) => self.pay_direct().await,
                    Ok(false) => Err(PaymentError::StorageUnavailable),
                    Err(err) => Err(PaymentError::StorageProbe(err.to_string())),
                },
                PromptChoice::Cancel => Err(PaymentError::Cancelled),
            };
        }

        self.pay_direct().await
    }

    async fn pay_direct(&self) -> Result<Receipt, PaymentError> {
        let receipt = self
            .payments
            .purchase_product(self.config.platform_product_id())
            .await?;

        if !receipt.has_transaction_receipt() {
            return Err(PaymentError::Declined(
                "platform returned an empty receipt".to_string(),
            ));
        }

        Ok(receipt)
    }
}

impl core::fmt::Debug for PurchaseOrchestrator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PurchaseOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
