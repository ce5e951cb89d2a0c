//! Error types for the Product actor.

use crate::error::{Classify, ErrorKind};
use thiserror::Error;

/// Errors that can occur during catalog and stock operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// The requested product was not found.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The product is switched off in the catalog.
    #[error("{name} is currently unavailable")]
    Unavailable { name: String },

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    /// Zero, or a quantity that would overflow the ledger.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Catalog data that cannot be stored (blank name, negative price, inverted bounds).
    #[error("Invalid product definition: {0}")]
    InvalidDefinition(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl Classify for ProductError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unavailable { .. } | Self::InsufficientStock { .. } => ErrorKind::Conflict,
            Self::InvalidQuantity(_) | Self::InvalidDefinition(_) => ErrorKind::Validation,
            Self::ActorCommunicationError(_) => ErrorKind::Dependency,
        }
    }
}
