//! # Actor Framework
//!
//! Building blocks for type-safe resource actors on Tokio. Each resource type (products,
//! carts, orders, customers) lives in its own `ResourceActor<T>`: a task that exclusively
//! owns a keyed store and serves typed requests one at a time. Callers talk to it through a
//! cloneable `ResourceClient<T>`.
//!
//! ## Why actors for business records?
//!
//! - **No ambient shared state**: a store is reachable only through its client.
//! - **Indivisible check-and-mutate**: a hook such as "reserve 3 units if at least 3 are left"
//!   runs inside the owning loop, so two callers can never both pass the check on the same
//!   units.
//! - **All-or-nothing hooks**: updates and actions mutate a working copy that is stored only
//!   on success.
//! - **Independent progress**: actors run in parallel; slow work done *outside* an actor
//!   (a payment call, say) never blocks its store.
//!
//! Further reading: [Actors with Tokio](https://ryhl.io/blog/actors-with-tokio/).
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - domain types, their keys, DTOs and hooks
//! 2. **Runtime Layer** ([`ResourceActor`]) - message loop and store ownership
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - typed requests and error mapping
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **run time** via `run(context)`, not at construction time.
//! A cart actor that needs live product prices is created first and handed the product
//! client when it starts:
//!
//! ```rust,ignore
//! let (product_actor, products) = ResourceActor::<Product>::new(32);
//! let (cart_actor, carts) = ResourceActor::<Cart>::new(32);
//!
//! tokio::spawn(product_actor.run(()));
//! tokio::spawn(cart_actor.run(CartContext { products: products.clone(), pricing }));
//! ```
//!
//! ## Errors
//!
//! Every request resolves to `Result<_, FrameworkError<T::Error>>`. The entity's own error
//! arrives unboxed in [`FrameworkError::Entity`]; the remaining variants describe the
//! plumbing (closed actor, missing key, duplicate key).
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real `ResourceClient<T>` from scripted expectations, so a
//! service built on several actors can be tested with any subset of them replaced.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::{ClientResult, ResourceClient};
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
