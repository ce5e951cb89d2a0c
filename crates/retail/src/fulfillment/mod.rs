//! # Order lifecycle service
//!
//! [`OrderService`] is the request-facing side of the Order actor: reads with ownership
//! checks, payment through the [`PaymentGateway`], status moves, and restocking on
//! cancellation and refund.
//!
//! The gateway call happens here, between two actor requests: a claim that marks the order's
//! payment `processing`, and the request that records the outcome. No actor waits on the
//! gateway, so a slow payment holds up neither the order store nor any stock.

use crate::clients::{OrderClient, ProductClient};
use crate::identity::Principal;
use crate::model::{CustomerId, Order, OrderNumber, OrderStatus, PaymentMethod, Tracking};
use crate::order_actor::OrderError;
use crate::payment::{PaymentGateway, PaymentOutcome, PaymentRequest};
use actor_framework::ActorClient;
use std::sync::Arc;
use tracing::{error, info, instrument, warn, Instrument, Span};

/// How the customer wants to pay for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub payer_reference: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    orders: OrderClient,
    products: ProductClient,
    gateway: Arc<dyn PaymentGateway>,
}

impl OrderService {
    pub fn new(orders: OrderClient, products: ProductClient, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            orders,
            products,
            gateway,
        }
    }

    /// One order, if `by` may see it.
    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        by: Principal,
        order_number: OrderNumber,
    ) -> Result<Order, OrderError> {
        let order = self.orders.require(order_number).await?;
        authorize_read(&by, &order)?;
        Ok(order)
    }

    /// A customer's orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        by: Principal,
        customer: CustomerId,
    ) -> Result<Vec<Order>, OrderError> {
        if !by.can_access(customer) {
            return Err(OrderError::Forbidden(format!(
                "{} cannot list orders of {customer}",
                by.customer
            )));
        }
        let mut orders: Vec<Order> = self
            .orders
            .list()
            .await?
            .into_iter()
            .filter(|order| order.customer == customer)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Charges the order's total and records the outcome.
    ///
    /// The order is claimed first (`processing`), so a concurrent second attempt is turned
    /// away before the gateway is called. A decline is not an error: the order comes back
    /// with payment status `failed` and may be paid again.
    ///
    /// Claim, charge and settlement run in their own task. A caller that gives up waiting
    /// does not leave the claim behind.
    #[instrument(skip(self, details), fields(method = ?details.method))]
    pub async fn process_payment(
        &self,
        by: Principal,
        order_number: OrderNumber,
        details: PaymentDetails,
    ) -> Result<Order, OrderError> {
        let service = self.clone();
        tokio::spawn(
            async move { service.charge_claimed(by, order_number, details).await }
                .instrument(Span::current()),
        )
        .await
        .map_err(|e| OrderError::ActorCommunicationError(format!("payment task failed: {e}")))?
    }

    async fn charge_claimed(
        &self,
        by: Principal,
        order_number: OrderNumber,
        details: PaymentDetails,
    ) -> Result<Order, OrderError> {
        let order = self.orders.begin_payment(order_number.clone(), by).await?;

        let request = PaymentRequest {
            order_number: order_number.clone(),
            amount: order.total(),
            method: details.method,
            payer_reference: details.payer_reference,
        };
        let outcome = match self.gateway.charge(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%order_number, error = %e, "Gateway call failed, releasing payment claim");
                if let Err(abort) = self
                    .orders
                    .abort_payment(order_number.clone(), by, e.to_string())
                    .await
                {
                    error!(%order_number, error = %abort, "Payment claim not released");
                }
                return Err(OrderError::PaymentGateway(e.to_string()));
            }
        };
        let approved = outcome.is_approved();

        match self
            .orders
            .record_payment(order_number.clone(), by, details.method, outcome)
            .await
        {
            Ok(order) => {
                info!(%order_number, approved, payment_status = ?order.payment_status, "Payment recorded");
                Ok(order)
            }
            Err(e) => {
                if approved {
                    error!(%order_number, error = %e, "Approved payment could not be recorded");
                }
                Err(e)
            }
        }
    }

    /// Moves the order one step forward. Staff only.
    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        by: Principal,
        order_number: OrderNumber,
        to: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, OrderError> {
        self.orders.advance(order_number, to, by, note).await
    }

    /// Cancels the order and returns its items to stock.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        by: Principal,
        order_number: OrderNumber,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        let order = self.orders.cancel(order_number, by, reason).await?;
        self.restock(&order).await;
        Ok(order)
    }

    /// Refunds the order and returns its items to stock. Staff only.
    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        by: Principal,
        order_number: OrderNumber,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        let order = self.orders.refund(order_number, by, reason).await?;
        self.restock(&order).await;
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn update_tracking(
        &self,
        by: Principal,
        order_number: OrderNumber,
        tracking: Tracking,
    ) -> Result<Order, OrderError> {
        self.orders.update_tracking(order_number, by, tracking).await
    }

    async fn restock(&self, order: &Order) {
        for item in &order.items {
            match self.products.release_stock(item.product_id, item.quantity).await {
                Ok(level) => {
                    info!(order_number = %order.order_number, product = %item.product_id, quantity = item.quantity, level, "Restocked");
                }
                Err(e) => {
                    warn!(order_number = %order.order_number, product = %item.product_id, error = %e, "Restock failed");
                }
            }
        }
    }
}

fn authorize_read(by: &Principal, order: &Order) -> Result<(), OrderError> {
    if by.can_access(order.customer) {
        Ok(())
    } else {
        Err(OrderError::Forbidden(format!(
            "{} cannot access order {}",
            by.customer, order.order_number
        )))
    }
}
