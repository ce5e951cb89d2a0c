//! # Payment
//!
//! The payment step is a collaborator behind [`PaymentGateway`]. The order service calls it
//! outside every actor loop, so a slow gateway delays only the order being paid.
//!
//! [`SimulatedGateway`] is the only implementation: it waits a configurable delay and
//! approves with a configurable probability.

pub mod simulator;

pub use simulator::SimulatedGateway;

use crate::error::{Classify, ErrorKind};
use crate::model::{OrderNumber, PaymentMethod};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub order_number: OrderNumber,
    pub amount: Decimal,
    pub method: PaymentMethod,
    /// Method-specific payer reference (masked card, UPI handle, wallet id).
    pub payer_reference: Option<String>,
}

/// What the gateway decided. A decline is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved { transaction_id: String },
    Declined { reason: String },
}

impl PaymentOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }
}

/// The gateway could not be reached or gave no answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

impl Classify for PaymentError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Dependency
    }
}

/// A payment processor. One call is one attempt; retrying is the caller's decision.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError>;
}
