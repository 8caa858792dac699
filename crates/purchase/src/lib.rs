//! `iapflow-purchase` — the purchase reconciliation state machine.
//!
//! One [`PurchaseOrchestrator`] drives one product's purchase lifecycle:
//! recover and submit a pending record if one exists, otherwise load the
//! product, execute the platform payment, run the application's submission
//! callback, and durably record any paid purchase whose submission did not
//! stick. All collaborators (catalog, record store, payment gateway,
//! authentication, prompt, cloud probe) are injected as traits.

pub mod auth;
pub mod config;
pub mod orchestrator;
pub mod outcome;
pub mod payment;
pub mod submit;

pub use auth::AuthenticationGate;
pub use config::PurchaseConfig;
pub use orchestrator::PurchaseOrchestrator;
pub use outcome::{Outcome, ReturnCode};
pub use payment::{
    CloudAvailability, PaymentError, PaymentGateway, PromptChoice, PurchasePrompt,
};
pub use submit::{SubmissionError, SubmissionRequest, SubmitPurchase};
