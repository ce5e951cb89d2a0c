//! Custom actions for the Cart actor. Every action answers with the cart as persisted.

use crate::model::ProductId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Adds `quantity` units, merging into an existing line for the same product.
    AddItem { product_id: ProductId, quantity: u32 },
    /// Replaces the quantity of an existing line.
    SetQuantity { product_id: ProductId, quantity: u32 },
    RemoveItem { product_id: ProductId },
    ApplyCoupon(String),
    RemoveCoupon,
    /// Reprices against the live catalog and drops products that no longer exist.
    Refresh,
    /// Empties the cart.
    Clear,
    /// Claims a non-empty cart for one checkout. Fails if another checkout holds it.
    BeginCheckout,
    /// Empties a claimed cart once its order exists, and drops the claim.
    CompleteCheckout,
    /// Drops the claim and leaves the items in place.
    AbortCheckout,
}
