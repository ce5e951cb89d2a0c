//! Custom actions for the Customer actor.

use crate::model::OrderNumber;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerAction {
    /// Appends the order to the history, adds to total spent and awards loyalty points.
    /// Recording the same order twice changes nothing.
    RecordPurchase {
        order_number: OrderNumber,
        amount: Decimal,
    },
}
