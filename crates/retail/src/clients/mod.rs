//! Type-safe wrappers around each actor's `ResourceClient`, mapping framework errors into
//! the resource's own error type.

pub mod cart_client;
pub mod customer_client;
pub mod order_client;
pub mod product_client;

pub use cart_client::CartClient;
pub use customer_client::CustomerClient;
pub use order_client::OrderClient;
pub use product_client::ProductClient;
