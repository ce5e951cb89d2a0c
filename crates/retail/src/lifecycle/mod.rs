//! # System Lifecycle
//!
//! [`ShopSystem`] creates every actor, wires them together and shuts them down.
//!
//! ## Wiring
//!
//! Actors are created first and receive their dependencies when they start (`run(context)`):
//!
//! ```rust,ignore
//! let (product_actor, products) = product_actor::new(buffer);
//! let (cart_actor, carts) = cart_actor::new(buffer);
//!
//! tokio::spawn(product_actor.run(()));
//! tokio::spawn(cart_actor.run(CartContext { products: ProductClient::new(products.clone()), pricing }));
//! ```
//!
//! The dependency graph is acyclic (carts read products; nothing reads carts), so shutdown
//! needs no explicit signal: dropping every client closes each channel, and the cart actor
//! releases its product client as it exits.
//!
//! ## Persistence
//!
//! [`ShopSystem::snapshot`] lists every store into a [`SystemSnapshot`];
//! [`ShopSystem::restore`] starts a system seeded from one. Key counters resume after the
//! highest restored product and customer ids.

pub mod shop_system;

pub use shop_system::*;
