//! The running shop and its snapshot.
//!
//! [`ShopSystem::start`] spawns the four actors, hands the cart actor its product client and
//! builds the checkout and order services over clones of the clients. A [`SystemSnapshot`]
//! seeds a new system through [`ShopSystem::restore`]; claims that were in flight when it was
//! taken are settled first, since the tasks holding them did not survive.
//! [`ShopSystem::shutdown`] drops every client and joins the actor tasks.

use crate::cart_actor::{self, CartContext, CartError};
use crate::checkout::CheckoutService;
use crate::clients::{CartClient, CustomerClient, OrderClient, ProductClient};
use crate::config::ShopConfig;
use crate::customer_actor::{self, CustomerError};
use crate::error::{Classify, ErrorKind};
use crate::fulfillment::OrderService;
use crate::model::{Cart, Customer, Order, PaymentStatus, Product};
use crate::order_actor::{self, OrderError};
use crate::payment::{PaymentGateway, SimulatedGateway};
use crate::product_actor::{self, ProductError};
use actor_framework::ActorClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Customer(#[from] CustomerError),
    #[error("Snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("Actor task failed: {0}")]
    ActorTask(String),
}

impl Classify for SystemError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Product(e) => e.kind(),
            Self::Cart(e) => e.kind(),
            Self::Order(e) => e.kind(),
            Self::Customer(e) => e.kind(),
            Self::Snapshot(_) | Self::ActorTask(_) => ErrorKind::Dependency,
        }
    }
}

/// Every store's contents, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub carts: Vec<Cart>,
    pub orders: Vec<Order>,
}

impl SystemSnapshot {
    pub fn to_json(&self) -> Result<String, SystemError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SystemError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Releases checkout claims on carts and marks payments that were mid-charge as failed.
    /// The failed payment can be retried.
    pub fn settle_in_flight(&mut self) {
        for cart in self.carts.iter_mut().filter(|cart| cart.is_checking_out()) {
            info!(customer = %cart.customer, "Releasing checkout claim from snapshot");
            cart.checkout_started_at = None;
        }
        for order in self
            .orders
            .iter_mut()
            .filter(|order| order.payment_status == PaymentStatus::Processing)
        {
            warn!(order_number = %order.order_number, "Payment was in flight at snapshot, marking failed");
            order.payment_status = PaymentStatus::Failed;
        }
    }
}

/// The running shop: one actor per resource plus the two services built on them.
///
/// # Example
///
/// ```ignore
/// let system = ShopSystem::new(ShopConfig::from_env()?);
///
/// let mug = system.product_client.create_product(ProductCreate::new("Mug", price, 10)).await?;
/// system.cart_client.add_item(customer, mug.id, 2).await?;
/// let order = system.checkout.place_order(customer, request).await?;
///
/// system.shutdown().await?;
/// ```
pub struct ShopSystem {
    pub product_client: ProductClient,
    pub cart_client: CartClient,
    pub order_client: OrderClient,
    pub customer_client: CustomerClient,

    pub checkout: CheckoutService,
    pub order_service: OrderService,

    pub config: ShopConfig,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl ShopSystem {
    /// Starts an empty shop with the simulated gateway from `config`.
    pub fn new(config: ShopConfig) -> Self {
        let gateway = Arc::new(SimulatedGateway::new(&config.payment));
        Self::start(config, gateway, SystemSnapshot::default())
    }

    /// Starts an empty shop with a custom payment gateway.
    pub fn with_gateway(config: ShopConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self::start(config, gateway, SystemSnapshot::default())
    }

    /// Starts a shop seeded from `snapshot`.
    pub fn restore(config: ShopConfig, snapshot: SystemSnapshot) -> Self {
        let gateway = Arc::new(SimulatedGateway::new(&config.payment));
        Self::start(config, gateway, snapshot)
    }

    fn start(config: ShopConfig, gateway: Arc<dyn PaymentGateway>, mut snapshot: SystemSnapshot) -> Self {
        snapshot.settle_in_flight();
        let buffer = config.actor_buffer.max(1);
        info!(
            products = snapshot.products.len(),
            customers = snapshot.customers.len(),
            carts = snapshot.carts.len(),
            orders = snapshot.orders.len(),
            "Starting shop"
        );

        // 1. Create actors (no dependencies yet)
        let (product_actor, products) = product_actor::restore(buffer, snapshot.products);
        let (customer_actor, customers) = customer_actor::restore(buffer, snapshot.customers);
        let (cart_actor, carts) = cart_actor::restore(buffer, snapshot.carts);
        let (order_actor, orders) = order_actor::restore(buffer, snapshot.orders);

        let product_client = ProductClient::new(products);
        let customer_client = CustomerClient::new(customers);
        let cart_client = CartClient::new(carts);
        let order_client = OrderClient::new(orders);
        let pricing = Arc::new(config.pricing.clone());

        // 2. Start actors with injected context
        let handles = vec![
            tokio::spawn(product_actor.run(())),
            tokio::spawn(customer_actor.run(())),
            tokio::spawn(cart_actor.run(CartContext {
                products: product_client.clone(),
                pricing: pricing.clone(),
            })),
            tokio::spawn(order_actor.run(())),
        ];

        // 3. Services hold clones only
        let checkout = CheckoutService::new(
            cart_client.clone(),
            product_client.clone(),
            order_client.clone(),
            customer_client.clone(),
            pricing,
            config.order_number_attempts,
        );
        let order_service = OrderService::new(order_client.clone(), product_client.clone(), gateway);

        Self {
            product_client,
            cart_client,
            order_client,
            customer_client,
            checkout,
            order_service,
            config,
            handles,
        }
    }

    /// Copies every store. Stores are read one after another, so a snapshot taken under
    /// traffic is per-store consistent only.
    pub async fn snapshot(&self) -> Result<SystemSnapshot, SystemError> {
        let mut products = self.product_client.list().await?;
        products.sort_by_key(|product| product.id);
        let mut customers = self.customer_client.list().await?;
        customers.sort_by_key(|customer| customer.id);
        let mut carts = self.cart_client.list().await?;
        carts.sort_by_key(|cart| cart.customer);
        let mut orders = self.order_client.list().await?;
        orders.sort_by(|a, b| a.order_number.cmp(&b.order_number));

        Ok(SystemSnapshot {
            products,
            customers,
            carts,
            orders,
        })
    }

    /// Gracefully shuts down the entire system.
    ///
    /// Dropping the services and clients closes every actor channel; each actor drains and
    /// exits. Returns an error if any actor task panicked.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down shop...");

        drop(self.checkout);
        drop(self.order_service);
        drop(self.product_client);
        drop(self.cart_client);
        drop(self.order_client);
        drop(self.customer_client);

        let mut failures = Vec::new();
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                failures.push(e.to_string());
            }
        }

        if failures.is_empty() {
            info!("Shop shut down");
            Ok(())
        } else {
            Err(SystemError::ActorTask(failures.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CustomerId;
    use chrono::Utc;

    #[test]
    fn settling_releases_cart_claims() {
        let mut held = Cart::empty(CustomerId(1));
        held.checkout_started_at = Some(Utc::now());
        let mut snapshot = SystemSnapshot {
            carts: vec![held, Cart::empty(CustomerId(2))],
            ..SystemSnapshot::default()
        };

        snapshot.settle_in_flight();

        assert!(snapshot.carts.iter().all(|cart| !cart.is_checking_out()));
    }

    #[tokio::test]
    async fn restored_cart_accepts_edits_again() {
        let mut held = Cart::empty(CustomerId(1));
        held.checkout_started_at = Some(Utc::now());
        let system = ShopSystem::restore(
            ShopConfig::default(),
            SystemSnapshot {
                carts: vec![held],
                ..SystemSnapshot::default()
            },
        );

        let cart = system.cart_client.clear(CustomerId(1)).await.unwrap();
        assert!(!cart.is_checking_out());

        system.shutdown().await.unwrap();
    }
}
