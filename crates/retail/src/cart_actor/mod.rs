//! # Cart Actor
//!
//! One cart per customer, keyed by [`CustomerId`](crate::model::CustomerId). The actor's
//! context carries a [`ProductClient`](crate::clients::ProductClient) and the shared
//! [`PricingPolicy`](crate::pricing::PricingPolicy), injected at `run` time:
//!
//! ```rust,ignore
//! let (product_actor, products) = product_actor::new(32);
//! let (cart_actor, carts) = cart_actor::new(32);
//! tokio::spawn(product_actor.run(()));
//! tokio::spawn(cart_actor.run(CartContext {
//!     products: ProductClient::new(products),
//!     pricing: Arc::new(PricingPolicy::default()),
//! }));
//! ```
//!
//! Saved totals are advisory. Checkout reprices from the live catalog before charging.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::CartContext;
pub use error::*;

use crate::model::Cart;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Cart actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Cart>, ResourceClient<Cart>) {
    ResourceActor::new(buffer_size)
}

/// Creates a Cart actor seeded with saved carts.
pub fn restore(buffer_size: usize, carts: Vec<Cart>) -> (ResourceActor<Cart>, ResourceClient<Cart>) {
    ResourceActor::with_entities(buffer_size, carts)
}
