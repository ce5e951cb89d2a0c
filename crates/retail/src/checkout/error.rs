//! Error types for the checkout orchestrator.

use crate::cart_actor::CartError;
use crate::customer_actor::CustomerError;
use crate::error::{Classify, ErrorKind};
use crate::order_actor::OrderError;
use crate::pricing::PricingError;
use crate::product_actor::ProductError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {which} address: missing {fields}")]
    InvalidAddress { which: &'static str, fields: String },

    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("{name} is currently unavailable")]
    ProductUnavailable { name: String },

    #[error("Quantity {quantity} for {name} must be between {min} and {max}")]
    QuantityOutOfRange {
        name: String,
        quantity: u32,
        min: u32,
        max: u32,
    },

    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("Could not allocate a unique order number after {0} attempts")]
    OrderNumberExhausted(u32),

    /// The task running the commit died before reporting back.
    #[error("Checkout interrupted: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Product(ProductError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Customer(#[from] CustomerError),
}

impl From<PricingError> for CheckoutError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::InvalidCoupon(code) => Self::InvalidCoupon(code),
        }
    }
}

impl From<ProductError> for CheckoutError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => Self::ProductNotFound(id),
            ProductError::Unavailable { name } => Self::ProductUnavailable { name },
            ProductError::InsufficientStock {
                name,
                requested,
                available,
            } => Self::InsufficientStock {
                name,
                requested,
                available,
            },
            other => Self::Product(other),
        }
    }
}

impl Classify for CheckoutError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCart
            | Self::MissingField(_)
            | Self::InvalidAddress { .. }
            | Self::InvalidCoupon(_)
            | Self::QuantityOutOfRange { .. } => ErrorKind::Validation,
            Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::ProductUnavailable { .. } | Self::InsufficientStock { .. } => {
                ErrorKind::Conflict
            }
            Self::OrderNumberExhausted(_) | Self::Interrupted(_) => ErrorKind::Dependency,
            Self::Product(e) => e.kind(),
            Self::Cart(e) => e.kind(),
            Self::Order(e) => e.kind(),
            Self::Customer(e) => e.kind(),
        }
    }
}
