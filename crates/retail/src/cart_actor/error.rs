//! Error types for the Cart actor.

use crate::error::{Classify, ErrorKind};
use crate::model::ProductId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Disabled in the catalog, or not enough stock for the requested quantity.
    #[error("{name} is unavailable: {detail}")]
    ProductUnavailable { name: String, detail: String },

    #[error("Quantity {quantity} for {name} must be between {min} and {max}")]
    QuantityOutOfRange {
        name: String,
        quantity: u32,
        min: u32,
        max: u32,
    },

    /// Adding to an existing line would push it past the product's maximum.
    #[error("Maximum of {max} for {name} exceeded ({in_cart} already in cart)")]
    MaximumExceeded { name: String, max: u32, in_cart: u32 },

    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    #[error("Cart not found: {0}")]
    CartNotFound(String),

    #[error("Cart is empty")]
    EmptyCart,

    /// Another checkout owns the cart.
    #[error("Checkout already in progress for {0}")]
    CheckoutInProgress(String),

    #[error("{0} is not in the cart")]
    ItemNotInCart(ProductId),

    /// The product actor could not be consulted.
    #[error("Catalog lookup failed: {0}")]
    Catalog(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl Classify for CartError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::ProductNotFound(_) | Self::CartNotFound(_) | Self::ItemNotInCart(_) => {
                ErrorKind::NotFound
            }
            Self::ProductUnavailable { .. } | Self::CheckoutInProgress(_) => ErrorKind::Conflict,
            Self::EmptyCart
            | Self::QuantityOutOfRange { .. }
            | Self::MaximumExceeded { .. }
            | Self::InvalidCoupon(_) => ErrorKind::Validation,
            Self::Catalog(_) | Self::ActorCommunicationError(_) => ErrorKind::Dependency,
        }
    }
}
