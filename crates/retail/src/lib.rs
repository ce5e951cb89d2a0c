//! # Retail
//!
//! A cart → checkout → order pipeline over shared inventory, built on `actor_framework`.
//!
//! ## Core Components
//!
//! - **[model]**: data held by the actors ([`Product`](model::Product), [`Cart`](model::Cart),
//!   [`Order`](model::Order), [`Customer`](model::Customer)) and their DTOs.
//! - **[product_actor]**, **[cart_actor]**, **[order_actor]**, **[customer_actor]**: the
//!   `ActorEntity` implementations, actions and per-actor errors.
//! - **[clients]**: typed wrappers that hide message passing.
//! - **[pricing]**: the pure pricing engine.
//! - **[checkout]**: cart to order, with all-or-nothing stock reservation.
//! - **[fulfillment]**: payment, status transitions and restocking.
//! - **[lifecycle]**: [`ShopSystem`](lifecycle::ShopSystem) starts, snapshots and stops it all.
//! - **[error]**: the shared error taxonomy and the request boundary.
//!
//! ## Testing
//!
//! See [`actor_framework::mock`] for utilities to test services without spawning actors.

pub mod cart_actor;
pub mod checkout;
pub mod clients;
pub mod config;
pub mod customer_actor;
pub mod error;
pub mod fulfillment;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod payment;
pub mod pricing;
pub mod product_actor;
