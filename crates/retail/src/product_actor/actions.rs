//! Custom actions for the Product actor.
//!
//! These are the Stock Ledger operations. Each one is evaluated inside the Product actor's
//! message loop, so `Reserve` checks and decrements in a single step that no other request
//! can interleave with.

/// Stock operations on a [`Product`](crate::model::Product).
///
/// Every action answers with the available quantity after it was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
    /// Decrements stock by `n` only if the product is available and at least `n` units are
    /// left.
    ///
    /// # Errors
    /// `Unavailable`, `InsufficientStock`, or `InvalidQuantity` for zero.
    Reserve(u32),
    /// Returns `n` previously reserved units (rollback, cancellation, refund).
    Release(u32),
    /// Adds newly received units.
    Restock(u32),
}

/// Available quantity after an action.
pub type StockLevel = u32;
