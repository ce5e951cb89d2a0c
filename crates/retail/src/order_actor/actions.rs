//! Custom actions for the Order actor.
//!
//! Each action carries the [`Principal`] performing it; authorization is decided inside the
//! actor against the order as stored, so the check and the mutation cannot be separated by
//! a concurrent request.

use crate::identity::Principal;
use crate::model::{OrderStatus, PaymentMethod, Tracking};
use crate::payment::PaymentOutcome;

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// One forward step along `pending → … → delivered`. Staff only.
    Advance {
        to: OrderStatus,
        by: Principal,
        note: Option<String>,
    },
    /// Staff from any non-terminal status; the owning customer from `pending`/`confirmed`.
    Cancel {
        by: Principal,
        reason: Option<String>,
    },
    /// Staff only. A paid order's payment moves to `refunded`.
    Refund {
        by: Principal,
        reason: Option<String>,
    },
    /// Claims the payment axis for one charge: checks payability and moves it to
    /// `processing`. A concurrent second claim fails with `PaymentInProgress`.
    BeginPayment { by: Principal },
    /// Applies a gateway outcome to a claimed payment. An approval also records `method` as
    /// the one that paid.
    RecordPayment {
        by: Principal,
        method: PaymentMethod,
        outcome: PaymentOutcome,
    },
    /// Releases a claim whose charge never produced an outcome. The payment becomes `failed`
    /// and may be retried.
    AbortPayment { by: Principal, reason: String },
    /// Staff only, while `packed` or `shipped`. `None` fields keep their current value.
    UpdateTracking { by: Principal, tracking: Tracking },
}
