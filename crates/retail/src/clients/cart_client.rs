//! # Cart Client
//!
//! High-level API over the `Cart` actor. Carts are created lazily: the first `add_item`
//! for a customer creates the cart, and reads of a customer without one see an empty view.
use crate::cart_actor::{CartAction, CartError};
use crate::model::{Cart, CartCreate, CustomerId, ProductId};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Cart actor.
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
}

impl CartClient {
    pub fn new(inner: ResourceClient<Cart>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Cart> for CartClient {
    type Error = CartError;

    fn inner(&self) -> &ResourceClient<Cart> {
        &self.inner
    }

    fn map_error(e: FrameworkError<CartError>) -> Self::Error {
        match e {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound(id) => CartError::CartNotFound(id),
            other => CartError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl CartClient {
    /// The customer's cart, or an empty view when none exists yet. Never creates one.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, customer: CustomerId) -> Result<Cart, CartError> {
        Ok(self
            .get(customer)
            .await?
            .unwrap_or_else(|| Cart::empty(customer)))
    }

    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        customer: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        self.ensure_cart(customer).await?;
        self.action(
            customer,
            CartAction::AddItem {
                product_id,
                quantity,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        customer: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        self.action(
            customer,
            CartAction::SetQuantity {
                product_id,
                quantity,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        customer: CustomerId,
        product_id: ProductId,
    ) -> Result<Cart, CartError> {
        self.action(customer, CartAction::RemoveItem { product_id })
            .await
    }

    #[instrument(skip(self))]
    pub async fn apply_coupon(&self, customer: CustomerId, code: &str) -> Result<Cart, CartError> {
        self.action(customer, CartAction::ApplyCoupon(code.to_string()))
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_coupon(&self, customer: CustomerId) -> Result<Cart, CartError> {
        self.action(customer, CartAction::RemoveCoupon).await
    }

    /// Reprices the cart against the live catalog.
    #[instrument(skip(self))]
    pub async fn refresh(&self, customer: CustomerId) -> Result<Cart, CartError> {
        match self.action(customer, CartAction::Refresh).await {
            Err(CartError::CartNotFound(_)) => Ok(Cart::empty(customer)),
            other => other,
        }
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, customer: CustomerId) -> Result<Cart, CartError> {
        self.action(customer, CartAction::Clear).await
    }

    /// Claims the cart for a checkout and returns it as claimed, repriced against the live
    /// catalog.
    #[instrument(skip(self))]
    pub async fn begin_checkout(&self, customer: CustomerId) -> Result<Cart, CartError> {
        self.action(customer, CartAction::BeginCheckout).await
    }

    /// Empties the claimed cart once its order exists.
    #[instrument(skip(self))]
    pub async fn complete_checkout(&self, customer: CustomerId) -> Result<Cart, CartError> {
        self.action(customer, CartAction::CompleteCheckout).await
    }

    /// Gives the cart back to the customer unchanged.
    #[instrument(skip(self))]
    pub async fn abort_checkout(&self, customer: CustomerId) -> Result<Cart, CartError> {
        self.action(customer, CartAction::AbortCheckout).await
    }

    /// Creates the cart unless it exists. Concurrent first adds race safely: the loser sees
    /// `AlreadyExists`, which is success here.
    async fn ensure_cart(&self, customer: CustomerId) -> Result<(), CartError> {
        match self.inner.create(CartCreate { customer }).await {
            Ok(_) => {
                debug!(%customer, "Cart created");
                Ok(())
            }
            Err(FrameworkError::AlreadyExists(_)) => Ok(()),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    async fn action(&self, customer: CustomerId, action: CartAction) -> Result<Cart, CartError> {
        self.inner
            .perform_action(customer, action)
            .await
            .map_err(Self::map_error)
    }
}
