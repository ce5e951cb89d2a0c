//! # Order Client
//!
//! High-level API over the `Order` actor.
use crate::identity::Principal;
use crate::model::{Order, OrderCreate, OrderNumber, OrderStatus, PaymentMethod, Tracking};
use crate::order_actor::{OrderAction, OrderError};
use crate::payment::PaymentOutcome;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError<OrderError>) -> Self::Error {
        match e {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::AlreadyExists(id) => OrderError::DuplicateOrderNumber(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl OrderClient {
    /// Stores a new order. A taken order number comes back as `DuplicateOrderNumber`.
    #[instrument(skip(self, params), fields(order_number = %params.order_number))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn require(&self, order_number: OrderNumber) -> Result<Order, OrderError> {
        let missing = order_number.to_string();
        self.get(order_number)
            .await?
            .ok_or(OrderError::NotFound(missing))
    }

    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        order_number: OrderNumber,
        to: OrderStatus,
        by: Principal,
        note: Option<String>,
    ) -> Result<Order, OrderError> {
        self.action(order_number, OrderAction::Advance { to, by, note })
            .await
    }

    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        order_number: OrderNumber,
        by: Principal,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        self.action(order_number, OrderAction::Cancel { by, reason })
            .await
    }

    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        order_number: OrderNumber,
        by: Principal,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        self.action(order_number, OrderAction::Refund { by, reason })
            .await
    }

    /// Claims the order for one payment attempt. Fails if it is not payable or another
    /// attempt is in flight.
    #[instrument(skip(self))]
    pub async fn begin_payment(
        &self,
        order_number: OrderNumber,
        by: Principal,
    ) -> Result<Order, OrderError> {
        self.action(order_number, OrderAction::BeginPayment { by })
            .await
    }

    #[instrument(skip(self))]
    pub async fn abort_payment(
        &self,
        order_number: OrderNumber,
        by: Principal,
        reason: String,
    ) -> Result<Order, OrderError> {
        self.action(order_number, OrderAction::AbortPayment { by, reason })
            .await
    }

    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        order_number: OrderNumber,
        by: Principal,
        method: PaymentMethod,
        outcome: PaymentOutcome,
    ) -> Result<Order, OrderError> {
        self.action(
            order_number,
            OrderAction::RecordPayment {
                by,
                method,
                outcome,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn update_tracking(
        &self,
        order_number: OrderNumber,
        by: Principal,
        tracking: Tracking,
    ) -> Result<Order, OrderError> {
        self.action(order_number, OrderAction::UpdateTracking { by, tracking })
            .await
    }

    async fn action(&self, order_number: OrderNumber, action: OrderAction) -> Result<Order, OrderError> {
        self.inner
            .perform_action(order_number, action)
            .await
            .map_err(Self::map_error)
    }
}
