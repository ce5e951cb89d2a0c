//! # Order Actor
//!
//! Durable records of committed transactions, keyed by [`OrderNumber`](crate::model::OrderNumber).
//!
//! ## State machines
//!
//! ```text
//! status:   pending → confirmed → processing → packed → shipped → delivered
//!              └──────────┴────────────┴──────────┴────────┴──→ cancelled | refunded
//! payment:  pending → paid | failed,  failed → paid | failed,  paid → refunded
//! ```
//!
//! Forward moves are one step at a time and staff-only. The owning customer may cancel while
//! the order is `pending` or `confirmed`. An approved payment confirms a `pending` order; a
//! declined one leaves the status alone.
//!
//! Items and totals are never touched after creation; no action writes them.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Order;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size)
}

/// Creates an Order actor seeded with saved orders.
pub fn restore(
    buffer_size: usize,
    orders: Vec<Order>,
) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::with_entities(buffer_size, orders)
}
