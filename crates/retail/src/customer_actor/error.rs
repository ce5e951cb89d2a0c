//! Error types for the Customer actor.

use crate::error::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomerError {
    #[error("Customer not found: {0}")]
    NotFound(String),

    #[error("Invalid customer profile: {0}")]
    InvalidProfile(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl Classify for CustomerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidProfile(_) => ErrorKind::Validation,
            Self::ActorCommunicationError(_) => ErrorKind::Dependency,
        }
    }
}
