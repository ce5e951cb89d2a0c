/// A customer's pending selection of products.
///
/// # Actor Framework
/// Carts are keyed by their owner: [`ActorEntity::assign_id`](actor_framework::ActorEntity::assign_id)
/// returns the [`CustomerId`] from [`CartCreate`], so a customer has at most one cart and
/// creating a second is rejected by the actor.
///
/// `totals` is derived. It is rewritten by the pricing engine after every mutation and is
/// never set from outside.
use crate::model::{CustomerId, ProductId};
use crate::pricing::{PricedLine, Quote};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Price observed at the last recompute. Advisory.
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl CartItem {
    pub fn priced_line(&self) -> PricedLine {
        PricedLine::new(self.unit_price, self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub customer: CustomerId,
    pub items: Vec<CartItem>,
    pub coupon: Option<String>,
    pub totals: Quote,
    pub updated_at: DateTime<Utc>,
    /// Set while a checkout owns the cart. Edits are refused until it completes or aborts.
    #[serde(default)]
    pub checkout_started_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// A cart with no items and zero totals.
    pub fn empty(customer: CustomerId) -> Self {
        Self {
            customer,
            items: Vec::new(),
            coupon: None,
            totals: Quote::default(),
            updated_at: Utc::now(),
            checkout_started_at: None,
        }
    }

    pub fn is_checking_out(&self) -> bool {
        self.checkout_started_at.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.item(product_id).map_or(0, |item| item.quantity)
    }
}

/// Payload for creating a customer's cart.
#[derive(Debug, Clone, Copy)]
pub struct CartCreate {
    pub customer: CustomerId,
}
