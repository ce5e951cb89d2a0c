//! # Error taxonomy and the request boundary
//!
//! Every component keeps its own `thiserror` enum, and every one of them sorts itself into
//! one of five [`ErrorKind`]s through [`Classify`]. [`Rejection`] is what leaves the system:
//! a status code and a message safe to show a client.

use serde::Serialize;
use std::fmt::Display;

/// The five classes of failure a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or out-of-range input; the caller can fix it.
    Validation,
    /// Cart, product, order or customer absent.
    NotFound,
    /// Insufficient stock, unavailable product, already-paid order, illegal transition.
    Conflict,
    /// Role or ownership mismatch.
    Authorization,
    /// Payment gateway, catalog or actor failure.
    Dependency,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Authorization => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Dependency => 502,
        }
    }
}

/// Maps a component error onto the shared taxonomy.
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

/// Client-visible form of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub status: u16,
    pub kind: ErrorKind,
    pub message: String,
}

impl Rejection {
    /// Converts an error at the request boundary.
    ///
    /// Dependency failures are logged in full and reported generically; every other kind is
    /// user-correctable and keeps its specific message.
    pub fn from_error<E: Classify + Display>(error: &E) -> Self {
        let kind = error.kind();
        let message = match kind {
            ErrorKind::Dependency => {
                tracing::error!(error = %error, "Dependency failure");
                "A downstream service is unavailable, please retry".to_string()
            }
            _ => error.to_string(),
        };
        Self {
            status: kind.status_code(),
            kind,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum Sample {
        #[error("quantity 0 is out of range")]
        Bad,
        #[error("socket reset by peer at 10.0.0.7")]
        Down,
    }

    impl Classify for Sample {
        fn kind(&self) -> ErrorKind {
            match self {
                Self::Bad => ErrorKind::Validation,
                Self::Down => ErrorKind::Dependency,
            }
        }
    }

    #[test]
    fn validation_keeps_its_message() {
        let rejection = Rejection::from_error(&Sample::Bad);
        assert_eq!(rejection.status, 400);
        assert_eq!(rejection.message, "quantity 0 is out of range");
    }

    #[test]
    fn dependency_detail_is_not_exposed() {
        let rejection = Rejection::from_error(&Sample::Down);
        assert_eq!(rejection.status, 502);
        assert!(!rejection.message.contains("10.0.0.7"));
    }
}
