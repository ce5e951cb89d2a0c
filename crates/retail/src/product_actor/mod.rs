//! # Product Actor
//!
//! The catalog read model and the Stock Ledger in one resource actor. Catalog data (price,
//! bounds, availability, display fields) is maintained through updates; the available
//! quantity moves only through [`ProductAction`]s.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Product`]
//! - [`error`] - [`ProductError`]
//! - [`actions`] - [`ProductAction`] for stock management
//! - [`new()`] / [`restore()`] - factory functions returning the actor and its client
//!
//! ## Why stock lives in the actor
//!
//! `Reserve(n)` is "decrement by `n` only if at least `n` are left", evaluated inside the
//! actor's sequential loop. Two checkouts racing for the last units are serialized there,
//! never in request code:
//!
//! ```rust,ignore
//! // Both callers may have seen 3 units in a preview; exactly one of these succeeds.
//! let a = products.reserve_stock(id, 3);
//! let b = products.reserve_stock(id, 3);
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use retail::clients::ProductClient;
//! use retail::model::ProductCreate;
//! use retail::product_actor;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, generic_client) = product_actor::new(32);
//!     let client = ProductClient::new(generic_client);
//!     tokio::spawn(actor.run(()));
//!
//!     let kettle = client
//!         .create_product(ProductCreate::new("Kettle", Decimal::from(35), 10))
//!         .await?;
//!
//!     assert_eq!(client.reserve_stock(kettle.id, 4).await?, 6);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Product;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Product actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ResourceClient<Product>) {
    ResourceActor::new(buffer_size)
}

/// Creates a Product actor seeded with previously saved products.
pub fn restore(
    buffer_size: usize,
    products: Vec<Product>,
) -> (ResourceActor<Product>, ResourceClient<Product>) {
    ResourceActor::with_entities(buffer_size, products)
}
