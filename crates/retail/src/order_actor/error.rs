//! Error types for the Order actor and the services built on it.

use crate::error::{Classify, ErrorKind};
use crate::model::OrderStatus;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: String },

    #[error("Order {0} is already paid")]
    AlreadyPaid(String),

    #[error("A payment for order {0} is already in progress")]
    PaymentInProgress(String),

    #[error("No payment in progress for order {0}")]
    PaymentNotStarted(String),

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Invalid order: {0}")]
    Validation(String),

    #[error("Order number already in use: {0}")]
    DuplicateOrderNumber(String),

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl Classify for OrderError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidTransition { .. }
            | Self::AlreadyPaid(_)
            | Self::PaymentInProgress(_)
            | Self::PaymentNotStarted(_)
            | Self::DuplicateOrderNumber(_) => ErrorKind::Conflict,
            Self::Forbidden(_) => ErrorKind::Authorization,
            Self::Validation(_) => ErrorKind::Validation,
            Self::PaymentGateway(_) | Self::ActorCommunicationError(_) => ErrorKind::Dependency,
        }
    }
}
