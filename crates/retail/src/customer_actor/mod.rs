//! # Customer Actor
//!
//! A minimal local customer aggregate: profile, role and the purchase counters the checkout
//! updates after each order (history, total spent, loyalty points).

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::loyalty_points_for;
pub use error::*;

use crate::model::Customer;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Customer actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Customer>, ResourceClient<Customer>) {
    ResourceActor::new(buffer_size)
}

/// Creates a Customer actor seeded with saved customers.
pub fn restore(
    buffer_size: usize,
    customers: Vec<Customer>,
) -> (ResourceActor<Customer>, ResourceClient<Customer>) {
    ResourceActor::with_entities(buffer_size, customers)
}
