//! Pure data structures managed by the resource actors, plus their DTOs.

pub mod cart;
pub mod customer;
pub mod order;
pub mod product;

pub use cart::*;
pub use customer::*;
pub use order::*;
pub use product::*;
